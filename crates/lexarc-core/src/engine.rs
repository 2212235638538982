//! # Query Engine
//!
//! Evaluates filter/sort/paginate queries and citation-graph traversal
//! over stored records.
//!
//! Candidate narrowing: when a query carries an Equals predicate on an
//! indexed field, the index supplies candidate identities first (several
//! such predicates intersect); otherwise the whole kind is scanned.
//! Every predicate is then re-evaluated against the loaded record, so a
//! stale or truncated index entry can produce wasted loads but never a
//! wrong result.
//!
//! Ordering is deterministic: stable sort on the requested field with
//! ties broken by identity ascending, identity ascending when no sort is
//! requested. Identical queries over an unchanged store return identical
//! ordered results, which makes pagination repeatable.

use crate::primitives::MAX_TRAVERSAL_DEPTH;
use crate::query::{FilterOp, FilterValue, SearchQuery, SortOrder, compare_values, prepare};
use crate::records::{Citation, DomainRecord};
use crate::store::DocStore;
use crate::types::{LexarcError, RecordId, RecordKind};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, VecDeque};

// =============================================================================
// RESULTS
// =============================================================================

/// The outcome of one search: the page of records plus the match count
/// before pagination.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<R> {
    pub records: Vec<R>,
    pub matched: usize,
}

/// One visited node of a citation traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CitationNode {
    pub id: RecordId,
    pub depth: usize,
}

/// One traversed citing→cited edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CitationEdge {
    pub citing: RecordId,
    pub cited: RecordId,
}

/// Breadth-first expansion of the citation graph from one opinion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CitationTraversal {
    pub nodes: Vec<CitationNode>,
    pub edges: Vec<CitationEdge>,
}

// =============================================================================
// SEARCH ENGINE
// =============================================================================

/// Query evaluator over one document store.
#[derive(Debug)]
pub struct SearchEngine<'a> {
    store: &'a DocStore,
}

impl<'a> SearchEngine<'a> {
    /// Create an engine over a store handle.
    #[must_use]
    pub fn new(store: &'a DocStore) -> Self {
        Self { store }
    }

    /// Evaluate a query against one kind.
    pub fn search<R: DomainRecord>(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResult<R>, LexarcError> {
        let prepared = prepare(&query.filters)?;

        let candidates = self.candidates::<R>(query)?;

        // Load and filter. Documents that fail to deserialize are skipped
        // so one corrupt record cannot block reads of its kind; harder
        // failures (an unreadable medium) propagate.
        let mut matched: Vec<R> = Vec::new();
        for id in candidates {
            let record = match self.store.get::<R>(id) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(LexarcError::DeserializationError(e)) => {
                    tracing::warn!(kind = %R::KIND, %id, error = %e, "skipping unreadable document during search");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if prepared
                .iter()
                .all(|p| p.matches(record.field_value(&p.filter.field).as_ref()))
            {
                matched.push(record);
            }
        }

        let total = matched.len();
        sort_records(&mut matched, query);

        let page: Vec<R> = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(SearchResult {
            records: page,
            matched: total,
        })
    }

    /// Candidate identities, narrowed through the index when possible.
    fn candidates<R: DomainRecord>(
        &self,
        query: &SearchQuery,
    ) -> Result<BTreeSet<RecordId>, LexarcError> {
        let mut narrowed: Option<BTreeSet<RecordId>> = None;

        for filter in &query.filters {
            if filter.op != FilterOp::Equals {
                continue;
            }
            if !R::INDEXED_FIELDS.contains(&filter.field.as_str()) {
                continue;
            }
            let FilterValue::Scalar(value) = &filter.value else {
                continue;
            };

            let hits = self
                .store
                .indexes()
                .lookup(R::KIND, &filter.field, &value.index_key())?;
            narrowed = Some(match narrowed {
                Some(previous) => previous.intersection(&hits).copied().collect(),
                None => hits,
            });

            if narrowed.as_ref().is_some_and(BTreeSet::is_empty) {
                break;
            }
        }

        match narrowed {
            Some(ids) => Ok(ids),
            // No indexed-equals predicate: full scan of the kind.
            None => Ok(self.store.list_ids(R::KIND)?.collect()),
        }
    }

    /// Breadth-first citation traversal over the citing→cited relation.
    ///
    /// Each node is visited at most once even when the graph contains
    /// cycles; expansion stops at the depth bound or when no unvisited
    /// neighbors remain.
    pub fn traverse_citations(
        &self,
        start: RecordId,
        depth: usize,
    ) -> Result<CitationTraversal, LexarcError> {
        let depth = depth.min(MAX_TRAVERSAL_DEPTH);

        let mut traversal = CitationTraversal::default();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();

        visited.insert(start);
        queue.push_back((start, 0usize));
        traversal.nodes.push(CitationNode {
            id: start,
            depth: 0,
        });

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= depth {
                continue;
            }

            let citation_ids = self.store.indexes().lookup(
                RecordKind::Citation,
                "citing_opinion_id",
                &current.value().to_string(),
            )?;

            for citation_id in citation_ids {
                let Some(citation) = self.store.get::<Citation>(citation_id)? else {
                    continue;
                };

                traversal.edges.push(CitationEdge {
                    citing: citation.citing_opinion_id,
                    cited: citation.cited_opinion_id,
                });

                let next = citation.cited_opinion_id;
                if visited.insert(next) {
                    traversal.nodes.push(CitationNode {
                        id: next,
                        depth: current_depth + 1,
                    });
                    queue.push_back((next, current_depth + 1));
                }
            }
        }

        Ok(traversal)
    }
}

// =============================================================================
// ORDERING
// =============================================================================

/// Stable deterministic ordering: requested sort key first (records with
/// the field present sort before records without it), identity ascending
/// as the final tie-break.
fn sort_records<R: DomainRecord>(records: &mut [R], query: &SearchQuery) {
    records.sort_by(|a, b| {
        let by_key = match &query.sort {
            Some(spec) => {
                let ka = a.field_value(&spec.field);
                let kb = b.field_value(&spec.field);
                match (ka, kb) {
                    (Some(ka), Some(kb)) => {
                        let ord = compare_values(&ka, &kb).unwrap_or(Ordering::Equal);
                        match spec.order {
                            SortOrder::Ascending => ord,
                            SortOrder::Descending => ord.reverse(),
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            None => Ordering::Equal,
        };
        by_key.then(a.id().cmp(&b.id()))
    });
}

// =============================================================================
// TESTS
// =============================================================================
