//! Property-based tests for the language-pair traversal.
//!
//! Invariants that hold for every graph:
//! - Termination and no duplicate compound keys
//! - Idempotence: the same snapshot yields the same sequence
//! - Every seed is emitted
//! - A gloss outside the pair is a seed or one lateral hop from the core
//! - Pair direction does not change membership

use std::collections::BTreeSet;

use futures::executor::block_on;
use gloss_rs::{collect, Gloss, GlossId, GlossStore, Language, LanguagePair, MemoryStore, Relation, Situation};
use proptest::prelude::*;

const LANGUAGES: [&str; 3] = ["eng", "deu", "fra"];

// ============================================================================
// Strategy: small random graphs
// ============================================================================

#[derive(Debug, Clone)]
struct GraphShape {
    /// Language index per gloss.
    languages: Vec<usize>,
    /// (from, relation index into STORED, to)
    edges: Vec<(usize, usize, usize)>,
    seeds: Vec<usize>,
}

fn graph_shape() -> impl Strategy<Value = GraphShape> {
    (2usize..10).prop_flat_map(|n| {
        (
            prop::collection::vec(0..LANGUAGES.len(), n),
            prop::collection::vec((0..n, 0..Relation::STORED.len(), 0..n), 0..30),
            prop::collection::vec(0..n, 1..4),
        )
            .prop_map(|(languages, edges, seeds)| GraphShape { languages, edges, seeds })
    })
}

fn build(graph: &GraphShape) -> MemoryStore {
    let db = MemoryStore::new();
    for iso in LANGUAGES {
        db.add_language(Language::new(iso, iso)).unwrap();
    }
    db.create_situation(Situation::new("s")).unwrap();

    let ids: Vec<GlossId> = graph
        .languages
        .iter()
        .enumerate()
        .map(|(i, &l)| db.create_gloss(LANGUAGES[l], &format!("w{i}"), std::iter::empty::<String>()).unwrap())
        .collect();
    for &(a, r, b) in &graph.edges {
        if a != b {
            db.relate(ids[a], Relation::STORED[r], ids[b]).unwrap();
        }
    }
    for &s in &graph.seeds {
        db.add_situation_gloss("s", ids[s]).unwrap();
    }
    db
}

fn keys(glosses: &[Gloss]) -> Vec<String> {
    glosses.iter().map(|g| g.compound_key().to_string()).collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_collect_unique_and_idempotent(graph in graph_shape()) {
        let db = build(&graph);
        let pair = LanguagePair::new("deu", "eng");

        let first = keys(&block_on(collect(&db, "s", &pair)).unwrap());
        let second = keys(&block_on(collect(&db, "s", &pair)).unwrap());
        prop_assert_eq!(&first, &second);

        let unique: BTreeSet<&String> = first.iter().collect();
        prop_assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn prop_every_seed_is_emitted(graph in graph_shape()) {
        let db = build(&graph);
        let result: BTreeSet<String> =
            keys(&block_on(collect(&db, "s", &LanguagePair::new("deu", "eng"))).unwrap())
                .into_iter()
                .collect();

        for &s in &graph.seeds {
            let key = format!("{}:w{s}", LANGUAGES[graph.languages[s]]);
            prop_assert!(result.contains(&key), "seed {} missing", key);
        }
    }

    #[test]
    fn prop_outside_pair_only_seed_or_lateral(graph in graph_shape()) {
        let db = build(&graph);
        let pair = LanguagePair::new("deu", "eng");
        let result = block_on(collect(&db, "s", &pair)).unwrap();
        let seeds = block_on(db.glosses_of_situation("s")).unwrap();

        let mut lateral = BTreeSet::new();
        for gloss in result.iter().filter(|g| pair.contains(&g.language)) {
            for relation in Relation::LATERAL {
                for related in block_on(db.related_glosses(gloss, relation)).unwrap() {
                    lateral.insert(related.compound_key());
                }
            }
        }

        for gloss in result.iter().filter(|g| !pair.contains(&g.language)) {
            let key = gloss.compound_key();
            let is_seed = seeds.iter().any(|s| s.compound_key() == key);
            prop_assert!(is_seed || lateral.contains(&key), "{} has no reason to be collected", key);
        }
    }

    #[test]
    fn prop_pair_direction_keeps_membership(graph in graph_shape()) {
        let db = build(&graph);
        let forward: BTreeSet<String> =
            keys(&block_on(collect(&db, "s", &LanguagePair::new("deu", "eng"))).unwrap())
                .into_iter()
                .collect();
        let backward: BTreeSet<String> =
            keys(&block_on(collect(&db, "s", &LanguagePair::new("eng", "deu"))).unwrap())
                .into_iter()
                .collect();
        prop_assert_eq!(forward, backward);
    }
}
