//! Persistence tests: dense streams, text form and store snapshots.
//!
//! These tests verify that vectors survive a write + read cycle through
//! real files, and that semantic vectors are materialized on the way out.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use rand::SeedableRng;

use semvec::config::VsaConfig;
use semvec::vsa::encode::encode_term;
use semvec::vsa::ops::VsaOps;
use semvec::vsa::store::VectorStore;
use semvec::vsa::{BinaryVector, Dimension, VectorMode};

#[test]
fn dense_stream_survives_file_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("vectors.bin");
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    let vectors: Vec<BinaryVector> = (0..4)
        .map(|_| BinaryVector::random(Dimension::TEST, &mut rng))
        .collect();

    {
        let mut writer = BufWriter::new(File::create(&path).unwrap());
        for v in &vectors {
            v.write_words(&mut writer).unwrap();
        }
        writer.flush().unwrap();
    }

    assert_eq!(
        std::fs::metadata(&path).unwrap().len() as usize,
        4 * Dimension::TEST.byte_len()
    );

    let mut reader = BufReader::new(File::open(&path).unwrap());
    for v in &vectors {
        let back = BinaryVector::read_words(Dimension::TEST, &mut reader).unwrap();
        assert_eq!(back.to_bit_string(), v.to_bit_string());
    }
    assert!(BinaryVector::read_words(Dimension::TEST, &mut reader).is_err());
}

#[test]
fn semantic_vector_is_tallied_before_writing() {
    let ops = VsaOps::new(Dimension::TEST);
    let jazz = encode_term(&ops, "jazz");
    let rock = encode_term(&ops, "rock");
    let mut music = ops.zero();
    music.superpose(&jazz, 5.0, None).unwrap();
    music.superpose(&rock, 2.0, None).unwrap();
    assert_eq!(music.mode(), VectorMode::Semantic);

    let mut bytes = Vec::new();
    music.write_words(&mut bytes).unwrap();
    let back = BinaryVector::read_words(Dimension::TEST, &mut bytes.as_slice()).unwrap();
    assert_eq!(back.mode(), VectorMode::Elemental);
    assert_eq!(back.to_bit_string(), jazz.to_bit_string());
    // Writing does not conclude the votes.
    assert_eq!(music.total_votes(), 7);
}

#[test]
fn text_form_survives_file_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("vector.txt");
    let mut rng = rand::rngs::StdRng::seed_from_u64(9);
    let v = BinaryVector::random(Dimension::TEST, &mut rng);
    std::fs::write(&path, v.to_bit_string()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut back = BinaryVector::zero(Dimension::TEST);
    back.read_from_string(&text).unwrap();
    assert_eq!(back, v);

    let mut wrong = BinaryVector::zero(Dimension::new(512).unwrap());
    assert!(wrong.read_from_string(&text).is_err());
}

#[test]
fn store_snapshot_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("store.bin");
    let ops = VsaOps::new(Dimension::TEST);

    // First session: build and save.
    {
        let store = VectorStore::new(Dimension::TEST);
        store.insert_batch(&ops, &["sun", "moon", "star"]).unwrap();
        let mut sky = ops.zero();
        for term in ["sun", "moon", "star"] {
            sky.superpose(&store.get(term).unwrap(), 1.0, None).unwrap();
        }
        store.insert("sky", sky).unwrap();
        store.save_snapshot(&path).unwrap();
    }

    // Second session: reopen and search.
    {
        let store = VectorStore::load_snapshot(&path, Dimension::TEST).unwrap();
        assert_eq!(store.len(), 4);
        let sky = store.get("sky").unwrap();
        assert_eq!(sky.mode(), VectorMode::Elemental);
        let results = store.search(&encode_term(&ops, "moon"), 2).unwrap();
        assert_eq!(results[0].term, "moon");
        assert_eq!(results[1].term, "sky");
    }
}

#[test]
fn config_file_drives_operations() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("semvec.toml");
    std::fs::write(
        &path,
        "dimension = 2048\nnormalization = \"majority\"\nbinding = \"permute\"\n",
    )
    .unwrap();

    let config = VsaConfig::load(&path).unwrap();
    let ops = VsaOps::from_config(&config).unwrap();
    assert_eq!(ops.dim().get(), 2048);
    let v = encode_term(&ops, "jazz");
    assert_eq!(v.dimension().get(), 2048);
}
