//! # Result Graphs
//!
//! A `Graph` is an ordered list of statements. Two statement forms exist:
//!
//! ```text
//! <subject>/<predicate>/<target>     relation
//! <subject>/&/<json literal>         literal
//! ```
//!
//! The empty subject is the root context. All queries walk statements in
//! insertion order, so results are deterministic for a given graph but may
//! differ from other XDI implementations that index their graphs.
//!
//! ## Well-known statements
//!
//! - `/$is$ref/<address>`: the graph owner
//! - `<lc>$do/<permission>/<target>`: a permission granted by a link contract
//! - `<lc>[$do]*!:uuid:.../<permission>/<target>`: the same, granted by one
//!   instance of a link contract collection

use crate::envelope::Literal;
use crate::errors::XdiError;
use crate::syntax::XdiAddress;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Predicate that links the root to the owner of a graph.
pub const OWNER_PREDICATE: &str = "$is$ref";

/// Last subsegment of every link contract address.
pub const LINK_CONTRACT_SUFFIX: &str = "$do";

/// Collection subsegment that precedes a link contract instance.
pub const LINK_CONTRACT_COLLECTION: &str = "[$do]";

/// Marker that replaces the predicate in literal statements.
const LITERAL_MARKER: &str = "&";

// =============================================================================
// STATEMENTS
// =============================================================================

/// A single graph statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Statement {
    Relation {
        subject: XdiAddress,
        predicate: XdiAddress,
        target: XdiAddress,
    },
    Literal {
        subject: XdiAddress,
        value: Literal,
    },
}

impl Statement {
    pub fn subject(&self) -> &XdiAddress {
        match self {
            Statement::Relation { subject, .. } | Statement::Literal { subject, .. } => subject,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Relation {
                subject,
                predicate,
                target,
            } => write!(f, "{subject}/{predicate}/{target}"),
            Statement::Literal { subject, value } => {
                let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
                write!(f, "{subject}/{LITERAL_MARKER}/{json}")
            }
        }
    }
}

impl FromStr for Statement {
    type Err = XdiError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| XdiError::InvalidStatement {
            statement: text.to_string(),
            reason,
        };

        let (subject, predicate, object) = split_statement(text)
            .ok_or_else(|| invalid("expected subject/predicate/object".to_string()))?;

        let subject = XdiAddress::parse(subject).map_err(|e| invalid(e.to_string()))?;

        if predicate == LITERAL_MARKER {
            let value = serde_json::from_str(object).map_err(|e| invalid(e.to_string()))?;
            return Ok(Statement::Literal { subject, value });
        }

        let predicate = XdiAddress::parse(predicate).map_err(|e| invalid(e.to_string()))?;
        if predicate.is_root() {
            return Err(invalid("empty predicate".to_string()));
        }
        let target = XdiAddress::parse(object).map_err(|e| invalid(e.to_string()))?;

        Ok(Statement::Relation {
            subject,
            predicate,
            target,
        })
    }
}

impl TryFrom<String> for Statement {
    type Error = XdiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Statement> for String {
    fn from(statement: Statement) -> Self {
        statement.to_string()
    }
}

/// Split at the first two `/` that are not nested inside brackets.
fn split_statement(text: &str) -> Option<(&str, &str, &str)> {
    let mut depth = 0i32;
    let mut cuts = [0usize; 2];
    let mut found = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '<' | '{' => depth += 1,
            ')' | ']' | '>' | '}' => depth -= 1,
            '/' if depth == 0 => {
                cuts[found] = i;
                found += 1;
                if found == 2 {
                    break;
                }
            }
            _ => {}
        }
    }

    (found == 2).then(|| {
        (
            &text[..cuts[0]],
            &text[cuts[0] + 1..cuts[1]],
            &text[cuts[1] + 1..],
        )
    })
}

// =============================================================================
// GRAPH
// =============================================================================

/// Ordered statement store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    statements: Vec<Statement>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_statements(statements: impl IntoIterator<Item = Statement>) -> Self {
        Self {
            statements: statements.into_iter().collect(),
        }
    }

    /// Parse one statement per line; blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, XdiError> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::parse::<Statement>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_statements)
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn add_relation(&mut self, subject: XdiAddress, predicate: XdiAddress, target: XdiAddress) {
        self.push(Statement::Relation {
            subject,
            predicate,
            target,
        });
    }

    pub fn add_literal(&mut self, subject: XdiAddress, value: Literal) {
        self.push(Statement::Literal { subject, value });
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Targets of every `subject/predicate/*` relation.
    pub fn relations<'a>(
        &'a self,
        subject: &'a XdiAddress,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a XdiAddress> + 'a {
        self.statements.iter().filter_map(move |statement| match statement {
            Statement::Relation {
                subject: s,
                predicate: p,
                target,
            } if s == subject && p.as_str() == predicate => Some(target),
            _ => None,
        })
    }

    /// First literal stored on `subject`.
    pub fn literal(&self, subject: &XdiAddress) -> Option<&Literal> {
        self.statements.iter().find_map(|statement| match statement {
            Statement::Literal { subject: s, value } if s == subject => Some(value),
            _ => None,
        })
    }

    /// Owner of the graph: the target of the root `$is$ref` relation.
    pub fn owner_address(&self) -> Option<&XdiAddress> {
        let root = XdiAddress::root();
        self.statements.iter().find_map(|statement| match statement {
            Statement::Relation {
                subject,
                predicate,
                target,
            } if *subject == root && predicate.as_str() == OWNER_PREDICATE => Some(target),
            _ => None,
        })
    }

    /// Record `owner` as the graph owner.
    pub fn set_owner(&mut self, owner: XdiAddress) {
        self.add_relation(
            XdiAddress::root(),
            XdiAddress::from_trusted(OWNER_PREDICATE.to_string()),
            owner,
        );
    }

    /// Lazily enumerate every link contract, in first-appearance order.
    pub fn link_contracts(&self) -> LinkContracts<'_> {
        LinkContracts {
            graph: self,
            statements: self.statements.iter(),
            seen: HashSet::new(),
        }
    }
}

// =============================================================================
// LINK CONTRACTS
// =============================================================================

/// Permission verbs a link contract can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Get,
    Set,
    Del,
    Push,
    Connect,
    Send,
    All,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Get => "$get",
            Permission::Set => "$set",
            Permission::Del => "$del",
            Permission::Push => "$push",
            Permission::Connect => "$connect",
            Permission::Send => "$send",
            Permission::All => "$all",
        }
    }

    pub fn from_predicate(predicate: &XdiAddress) -> Option<Self> {
        match predicate.as_str() {
            "$get" => Some(Permission::Get),
            "$set" => Some(Permission::Set),
            "$del" => Some(Permission::Del),
            "$push" => Some(Permission::Push),
            "$connect" => Some(Permission::Connect),
            "$send" => Some(Permission::Send),
            "$all" => Some(Permission::All),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link contract found in a graph.
#[derive(Debug, Clone, Copy)]
pub struct LinkContract<'a> {
    graph: &'a Graph,
    address: &'a XdiAddress,
}

impl<'a> LinkContract<'a> {
    pub fn address(&self) -> &'a XdiAddress {
        self.address
    }

    /// Every `(permission, target)` pair granted by this contract.
    pub fn permissions(&self) -> impl Iterator<Item = (Permission, &'a XdiAddress)> + 'a {
        let address = self.address;
        self.graph
            .statements
            .iter()
            .filter_map(move |statement| match statement {
                Statement::Relation {
                    subject,
                    predicate,
                    target,
                } if subject == address => {
                    Permission::from_predicate(predicate).map(|permission| (permission, target))
                }
                _ => None,
            })
    }

    /// Targets granted under one permission.
    pub fn targets(&self, permission: Permission) -> impl Iterator<Item = &'a XdiAddress> + 'a {
        self.permissions()
            .filter(move |(p, _)| *p == permission)
            .map(|(_, target)| target)
    }

    /// `(authorizing, requesting)` authorities of a `(A/B)$do` contract.
    pub fn authorities(&self) -> Option<(XdiAddress, XdiAddress)> {
        let inner = self.address.as_str().strip_prefix('(')?;
        let close = matching_paren(inner)?;
        let (authorizing, requesting) = split_top_level_slash(&inner[..close])?;
        Some((
            XdiAddress::parse(authorizing).ok()?,
            XdiAddress::parse(requesting).ok()?,
        ))
    }
}

impl PartialEq for LinkContract<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

/// Index of the `)` closing an already-opened `(`.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level_slash(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '<' | '{' => depth += 1,
            ')' | ']' | '>' | '}' => depth -= 1,
            '/' if depth == 0 => return Some((&text[..i], &text[i + 1..])),
            _ => {}
        }
    }
    None
}

/// `...$do`, or `...[$do]` followed by a single instance subsegment
/// such as `*!:uuid:1234` or `!:uuid:1234`.
fn is_link_contract(address: &XdiAddress) -> bool {
    if address.ends_with(LINK_CONTRACT_SUFFIX) {
        return true;
    }
    let text = address.as_str();
    let Some(start) = text.rfind(LINK_CONTRACT_COLLECTION) else {
        return false;
    };
    let instance = &text[start + LINK_CONTRACT_COLLECTION.len()..];
    let member = instance.strip_prefix('*').unwrap_or(instance);
    member.starts_with('!')
        && !member.contains(['[', '(', '<', '{', '$', '#', '+', '=', '*', '@'])
}

/// Lazy, single-pass iterator over the link contracts of a graph.
pub struct LinkContracts<'a> {
    graph: &'a Graph,
    statements: std::slice::Iter<'a, Statement>,
    seen: HashSet<&'a XdiAddress>,
}

impl<'a> Iterator for LinkContracts<'a> {
    type Item = LinkContract<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for statement in self.statements.by_ref() {
            let subject = statement.subject();
            if is_link_contract(subject) && self.seen.insert(subject) {
                return Some(LinkContract {
                    graph: self.graph,
                    address: subject,
                });
            }
        }
        None
    }
}

// =============================================================================
// MESSAGE RESULT
// =============================================================================

/// Response to a message envelope: the graph returned by the peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    #[serde(default)]
    graph: Graph,
}

impl MessageResult {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn to_json(&self) -> Result<String, XdiError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, XdiError> {
        Ok(serde_json::from_str(json)?)
    }
}
