//! Splitting a compiled query into several `$filter` strings that each fit
//! within the backend's URL length limit.
//!
//! For a query like `A and B and (C or D) and (E or F or G)` the shortest
//! split is the full cartesian product `A and B and C and E`, ... which also
//! yields the most requests. As a compromise, whole OR-groups are kept as long
//! as they fit, the rest is expanded as a cartesian product and the last group
//! is chunked into as few OR-groups as the remaining space allows.

use crate::compiler::CompiledQuery;
use crate::errors::FilterError;
use indexmap::IndexSet;
use log::debug;

pub const DEFAULT_MAX_FILTER_LENGTH: usize = 2000;

const AND: &str = " and ";
const OR: &str = " or ";

impl CompiledQuery {
    /// Filter strings whose combined results equal this query's results.
    /// A match-all query yields an empty list.
    pub fn compose_queries(&self, max_len: usize) -> Result<Vec<String>, FilterError> {
        match self.filter_string() {
            None => Ok(Vec::new()),
            Some(filter) if filter.len() <= max_len => Ok(vec![filter]),
            Some(_) => compose_queries(
                &self.unbreakable_filters(),
                &self.breakable_filters(),
                max_len,
            ),
        }
    }
}

/// Combine unbreakable conditions and breakable OR-groups into as few filter
/// strings of at most `max_len` characters as this strategy finds.
pub fn compose_queries(
    unbreakable: &[String],
    breakable: &[Vec<String>],
    max_len: usize,
) -> Result<Vec<String>, FilterError> {
    let mut groups: Vec<&[String]> = breakable
        .iter()
        .map(Vec::as_slice)
        .filter(|group| !group.is_empty())
        .collect();
    if unbreakable.is_empty() && groups.is_empty() {
        return Ok(Vec::new());
    }

    let mut base = unbreakable.join(AND);
    let required = joined_len(&[base.len(), longest_combination(&groups)]);
    if required > max_len {
        return Err(FilterError::TooComplex { max_len, required });
    }

    groups.sort_by_key(|group| group.len());

    let mut whole = 0;
    while whole < groups.len() {
        let candidate = join_and(&base, &any_of(groups[whole]));
        let rest = longest_combination(&groups[whole + 1..]);
        if joined_len(&[candidate.len(), rest]) > max_len {
            debug!(
                "Cannot fit filter group {} of {} completely, splitting the query",
                whole + 1,
                groups.len()
            );
            break;
        }
        base = candidate;
        whole += 1;
    }
    if whole == groups.len() {
        return Ok(vec![base]);
    }

    let (expanded, last) = groups[whole..].split_at(groups.len() - whole - 1);
    let prefixes: IndexSet<String> = cartesian_product(expanded)
        .into_iter()
        .map(|combination| {
            combination
                .iter()
                .fold(base.clone(), |prefix, condition| join_and(&prefix, condition))
        })
        .collect();

    let longest_prefix = prefixes.iter().map(String::len).max().unwrap_or(0);
    let separator = if longest_prefix > 0 { AND.len() } else { 0 };
    let budget = max_len.saturating_sub(longest_prefix + separator);
    let chunks = chunk_group(last[0], budget);

    let queries: IndexSet<String> = prefixes
        .iter()
        .flat_map(|prefix| chunks.iter().map(move |chunk| join_and(prefix, chunk)))
        .collect();
    debug!("Split filter into {} queries", queries.len());
    Ok(queries.into_iter().collect())
}

fn join_and(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{}{}{}", left, AND, right),
    }
}

/// Length of the non-empty parts joined with `and`
fn joined_len(parts: &[usize]) -> usize {
    let non_empty: Vec<usize> = parts.iter().copied().filter(|len| *len > 0).collect();
    non_empty.iter().sum::<usize>() + AND.len() * non_empty.len().saturating_sub(1)
}

/// Length of the longest `and`-joined pick of one condition per group
fn longest_combination(groups: &[&[String]]) -> usize {
    let longest: Vec<usize> = groups
        .iter()
        .map(|group| group.iter().map(String::len).max().unwrap_or(0))
        .collect();
    joined_len(&longest)
}

fn any_of(conditions: &[String]) -> String {
    match conditions {
        [single] => single.clone(),
        _ => format!("({})", conditions.join(OR)),
    }
}

fn cartesian_product<'a>(groups: &[&'a [String]]) -> Vec<Vec<&'a str>> {
    groups.iter().fold(vec![Vec::new()], |combinations, group| {
        combinations
            .iter()
            .flat_map(|combination| {
                group.iter().map(move |condition| {
                    let mut next = combination.clone();
                    next.push(condition.as_str());
                    next
                })
            })
            .collect()
    })
}

/// Greedily pack conditions into OR-groups of at most `budget` characters.
/// A single condition always forms a chunk of its own, even when too long.
fn chunk_group(conditions: &[String], budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for condition in conditions {
        current.push(condition.clone());
        if current.len() > 1 && any_of(&current).len() > budget {
            let overflow = current.pop().into_iter().collect::<Vec<_>>();
            chunks.push(any_of(&current));
            current = overflow;
        }
    }
    if !current.is_empty() {
        chunks.push(any_of(&current));
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nothing_to_compose() {
        assert!(compose_queries(&[], &[], 100).unwrap().is_empty());
    }

    #[test]
    fn test_everything_fits() {
        let queries = compose_queries(
            &strings(&["a eq 1", "b eq 2"]),
            &[strings(&["c eq 1", "c eq 2"])],
            100,
        )
        .unwrap();
        assert_eq!(queries, vec!["a eq 1 and b eq 2 and (c eq 1 or c eq 2)"]);
    }

    #[test]
    fn test_too_complex() {
        let err = compose_queries(&strings(&["a eq 'long value'"]), &[strings(&["b eq 1"])], 20)
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::TooComplex {
                max_len: 20,
                required: 28
            }
        );
    }

    #[test]
    fn test_last_group_is_chunked() {
        // "a eq 1 and (b eq 1 or b eq 2)" is 29 characters
        let queries = compose_queries(
            &strings(&["a eq 1"]),
            &[strings(&["b eq 1", "b eq 2", "b eq 3", "b eq 4"])],
            30,
        )
        .unwrap();
        assert_eq!(
            queries,
            vec![
                "a eq 1 and (b eq 1 or b eq 2)",
                "a eq 1 and (b eq 3 or b eq 4)"
            ]
        );
    }

    #[test]
    fn test_single_leftover_condition_is_bare() {
        let queries = compose_queries(
            &strings(&["a eq 1"]),
            &[strings(&["b eq 1", "b eq 2", "b eq 3"])],
            30,
        )
        .unwrap();
        assert_eq!(queries, vec!["a eq 1 and (b eq 1 or b eq 2)", "a eq 1 and b eq 3"]);
    }

    #[test]
    fn test_shorter_groups_kept_whole() {
        let queries = compose_queries(
            &[],
            &[
                strings(&["b eq 1", "b eq 2", "b eq 3"]),
                strings(&["a eq 1", "a eq 2"]),
            ],
            45,
        )
        .unwrap();
        assert_eq!(
            queries,
            vec![
                "(a eq 1 or a eq 2) and (b eq 1 or b eq 2)",
                "(a eq 1 or a eq 2) and b eq 3"
            ]
        );
    }

    #[test]
    fn test_middle_groups_expand_as_product() {
        let queries = compose_queries(
            &[],
            &[
                strings(&["a eq 1", "a eq 2"]),
                strings(&["b eq 1", "b eq 2"]),
            ],
            20,
        )
        .unwrap();
        assert_eq!(
            queries,
            vec![
                "a eq 1 and b eq 1",
                "a eq 1 and b eq 2",
                "a eq 2 and b eq 1",
                "a eq 2 and b eq 2"
            ]
        );
    }

    #[test]
    fn test_cartesian_product() {
        let a = strings(&["a1", "a2"]);
        let b = strings(&["b1"]);
        let product = cartesian_product(&[a.as_slice(), b.as_slice()]);
        assert_eq!(product, vec![vec!["a1", "b1"], vec!["a2", "b1"]]);
        assert_eq!(cartesian_product(&[]), vec![Vec::<&str>::new()]);
    }
}
