//! Static syntactic check that a generated graph query is read-only (C1).
//!
//! This is a first line of defense only — the authoritative safety property
//! comes from executing the query in a read-only session (see the graph
//! query adapter). The validator exists to reject obviously malformed or
//! clearly malicious LLM output quickly, with a clear reason, before it
//! reaches the graph store.

use crate::errors::ValidationError;

const FORBIDDEN_TOKENS: &[&str] = &[
    "CREATE",
    "MERGE",
    "DELETE",
    "SET",
    "REMOVE",
    "DROP",
    "DETACH DELETE",
    "CREATE INDEX",
    "CREATE CONSTRAINT",
];

/// Procedures a deployment has explicitly vetted as read-only. Empty by
/// default: any `CALL` is rejected until an operator extends this list, per
/// the conservative resolution of the CALL-allowlisting open question.
pub type ProcedureAllowlist<'a> = &'a [&'a str];

pub const EMPTY_ALLOWLIST: ProcedureAllowlist<'static> = &[];

/// Validate that `cypher` is a read-only, campaign-scoped query.
///
/// Rules, all of which must hold for acceptance:
/// 1. No forbidden token appears (uppercased match).
/// 2. At least one `MATCH` and exactly one top-level `RETURN`.
/// 3. The query references `$campaignUuid`.
/// 4. Any `CALL` names a procedure present in `allowlist`.
pub fn validate(cypher: &str, allowlist: ProcedureAllowlist) -> Result<(), ValidationError> {
    let upper = cypher.to_uppercase();

    for token in FORBIDDEN_TOKENS {
        if upper.contains(token) {
            return Err(ValidationError::ForbiddenToken((*token).to_string()));
        }
    }

    if let Some(proc_name) = extract_call_procedure(&upper) {
        if !allowlist.iter().any(|p| p.eq_ignore_ascii_case(&proc_name)) {
            return Err(ValidationError::DisallowedProcedure(proc_name));
        }
    }

    if !upper.contains("MATCH") {
        return Err(ValidationError::MissingMatch);
    }

    let return_count = count_top_level_returns(&upper);
    if return_count != 1 {
        return Err(ValidationError::WrongReturnCount(return_count));
    }

    if !cypher.contains("$campaignUuid") {
        return Err(ValidationError::MissingCampaignParameter);
    }

    Ok(())
}

/// Finds the procedure name following a `CALL` token, if any. Only handles
/// the `CALL proc.name(...)` shape; `CALL { ... }` subqueries are caught by
/// the forbidden-token scan inside the block itself.
fn extract_call_procedure(upper: &str) -> Option<String> {
    let idx = upper.find("CALL ")?;
    let rest = &upper[idx + "CALL ".len()..];
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Counts `RETURN` occurrences that are not nested inside a `CALL { ... }`
/// subquery block, approximating "top-level" well enough for the generated
/// queries this validator is meant to gate.
fn count_top_level_returns(upper: &str) -> usize {
    let mut depth = 0i32;
    let mut count = 0usize;
    let mut chars = upper.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            'R' if depth == 0 && upper[i..].starts_with("RETURN") => count += 1,
            _ => {}
        }
    }
    count
}
