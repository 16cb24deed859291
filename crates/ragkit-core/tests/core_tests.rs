use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ragkit_core::chunker::{chunk, chunk_documents, ChunkConfig};
use ragkit_core::error::Error;
use ragkit_core::types::{Document, Node};

const WORDS: &[&str] = &[
    "I", "have", "a", "dream", "that", "one", "day", "this", "nation", "will", "rise", "up",
    "and", "live", "out", "the", "true", "meaning", "of", "its", "creed", "Mr.", "naïve",
    "déjà", "vu", "supercalifragilisticexpialidocious",
];
const ENDINGS: &[&str] = &[". ", "! ", "? ", ".\n", ".\n\n", ", ", " ", "\" "];

/// Random prose-like text with varied sentence lengths, multibyte words and
/// paragraph breaks.
fn random_text(rng: &mut StdRng, words: usize) -> String {
    let mut out = String::new();
    for _ in 0..words {
        out.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
        let ending = if rng.gen_bool(0.2) { ENDINGS[rng.gen_range(0..ENDINGS.len())] } else { " " };
        out.push_str(ending);
    }
    out
}

fn reconstruct(nodes: &[Node], overlap: usize) -> String {
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        let skip = if i == 0 { 0 } else { overlap };
        out.extend(node.text.chars().skip(skip));
    }
    out
}

fn assert_invariants(text: &str, nodes: &[Node], config: &ChunkConfig) {
    for node in nodes {
        assert!(node.char_len() <= config.chunk_size, "node {} too long: {}", node.id, node.char_len());
        assert_eq!(node.text.chars().count(), node.char_len());
    }
    for pair in nodes.windows(2) {
        assert!(pair[0].start_char_idx < pair[1].start_char_idx, "ordered by start");
        assert_eq!(pair[0].end_char_idx - pair[1].start_char_idx, config.chunk_overlap, "exact overlap");
        let tail: String = pair[0].text.chars().skip(pair[0].char_len() - config.chunk_overlap).collect();
        let head: String = pair[1].text.chars().take(config.chunk_overlap).collect();
        assert_eq!(tail, head, "overlapping text is shared");
    }
    if let (Some(first), Some(last)) = (nodes.first(), nodes.last()) {
        assert_eq!(first.start_char_idx, 0);
        assert_eq!(last.end_char_idx, text.chars().count());
    }
    assert_eq!(reconstruct(nodes, config.chunk_overlap), text, "round trip");
}

#[test]
fn invariants_hold_for_random_documents() {
    let mut rng = StdRng::seed_from_u64(7);
    let configs = [(100, 10), (20, 19), (50, 1), (256, 64), (7, 3)];
    for round in 0..40 {
        let words = rng.gen_range(0..400);
        let text = random_text(&mut rng, words);
        let doc = Document::new(format!("doc-{round}"), text.clone());
        for (size, overlap) in configs {
            let config = ChunkConfig::new(size, overlap).expect("valid config");
            let nodes = chunk(&doc, &config).expect("chunk");
            if text.trim().is_empty() {
                assert!(nodes.is_empty());
            } else {
                assert_invariants(&text, &nodes, &config);
            }
        }
    }
}

#[test]
fn empty_document_yields_no_nodes() {
    let config = ChunkConfig::new(100, 10).unwrap();
    assert!(chunk(&Document::new("empty", ""), &config).unwrap().is_empty());
    assert!(chunk(&Document::new("blank", "   \n\n\t "), &config).unwrap().is_empty());
}

#[test]
fn short_document_yields_one_node_spanning_it() {
    let config = ChunkConfig::new(100, 10).unwrap();
    let doc = Document::new("hello", "Hello world.").with_metadata("file_name", "hello.txt");
    let nodes = chunk(&doc, &config).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].text, "Hello world.");
    assert_eq!((nodes[0].start_char_idx, nodes[0].end_char_idx), (0, 12));
    assert_eq!(nodes[0].doc_id, "hello");
    assert_eq!(nodes[0].metadata.get("file_name").map(String::as_str), Some("hello.txt"));
}

#[test]
fn overlap_equal_to_size_is_rejected() {
    let text = "Sentence number one is here. ".repeat(18);
    let doc = Document::new("long", text);
    let bad = ChunkConfig { chunk_size: 10, chunk_overlap: 10 };
    assert!(matches!(chunk(&doc, &bad), Err(Error::InvalidConfig(_))));
    assert!(matches!(chunk_documents(&[doc], &bad), Err(Error::InvalidConfig(_))));
}

#[test]
fn overlong_sentence_is_cut_at_chunk_size() {
    // One 60-char sentence with no boundary inside, then a short one.
    let long = "x".repeat(60);
    let text = format!("{long}. Short one.");
    let config = ChunkConfig::new(25, 5).unwrap();
    let nodes = chunk(&Document::new("d", text.clone()), &config).unwrap();
    assert_eq!(nodes[0].text, "x".repeat(25));
    assert_eq!(nodes[1].start_char_idx, 20);
    assert_eq!(nodes[1].end_char_idx, 45);
    assert_invariants(&text, &nodes, &config);
}

#[test]
fn prefers_sentence_boundaries_over_hard_cuts() {
    let text = "The cat sat. The dog ran far away. Birds sang loudly.";
    let config = ChunkConfig::new(36, 4).unwrap();
    let nodes = chunk(&Document::new("d", text), &config).unwrap();
    assert_eq!(nodes[0].text, "The cat sat. The dog ran far away.");
    assert!(nodes[1].text.ends_with("Birds sang loudly."));
    assert_invariants(text, &nodes, &config);
}

#[test]
fn chunk_documents_groups_nodes_per_document() {
    let config = ChunkConfig::new(40, 8).unwrap();
    let docs = vec![
        Document::new("a", "Alpha one. Alpha two. Alpha three. Alpha four."),
        Document::new("b", ""),
        Document::new("c", "Charlie."),
    ];
    let nodes = chunk_documents(&docs, &config).unwrap();
    let a_count = nodes.iter().filter(|n| n.doc_id == "a").count();
    assert!(a_count >= 2);
    assert!(nodes[..a_count].iter().all(|n| n.doc_id == "a"));
    assert_eq!(nodes.last().map(|n| n.doc_id.as_str()), Some("c"));
}

#[test]
fn nodes_serialize_to_json() {
    let config = ChunkConfig::new(100, 10).unwrap();
    let nodes = chunk(&Document::new("j", "Hello world.").with_metadata("k", "v"), &config).unwrap();
    let json = serde_json::to_value(&nodes[0]).unwrap();
    assert_eq!(json["id"], "j:0");
    assert_eq!(json["metadata"]["k"], "v");
    assert_eq!(json["end_char_idx"], 12);
}
