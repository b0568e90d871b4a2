use assert_cmd::Command;
use fastibs::index::write_kmers;
use fastibs::KmerIndex;
use predicates::str;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_index(path: &Path, kmer_length: usize, kmers: &[&str]) {
    let index = KmerIndex::from_kmers(kmer_length, kmers.iter().copied()).unwrap();
    write_kmers(&index, path).unwrap();
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_args() {
    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.assert().failure().stderr(str::contains("Usage"));
}

#[test]
fn test_stats_stdout() {
    let temp_dir = tempdir().unwrap();
    let index_path = temp_dir.path().join("ref.kdb");
    let fasta_path = temp_dir.path().join("ref.fa");
    write_index(&index_path, 4, &["ACGT"]);
    fs::write(&fasta_path, ">chr1 literal\nACGT\nACGT\n").unwrap();

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("stats")
        .arg(&index_path)
        .arg(&fasta_path)
        .arg("-q")
        .assert()
        .success()
        .stdout(
            "seqname\tstart\tend\ttotal_kmers\tobserved_kmers\tvariations\tkmer_distance\n\
             chr1 literal\t0\t8\t5\t2\t1\t1\n",
        );
}

#[test]
fn test_stats_output_and_summary() {
    let temp_dir = tempdir().unwrap();
    let index_path = temp_dir.path().join("ref.kdb");
    let fasta_path = temp_dir.path().join("ref.fa");
    let output_path = temp_dir.path().join("stats.tsv");
    let summary_path = temp_dir.path().join("summary.json");
    write_index(&index_path, 3, &["AAA"]);
    fs::write(&fasta_path, ">a\nAAAAAAAAAAAA\n>b\nCCCCCCCCCCCC\n").unwrap();

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("stats")
        .arg(&index_path)
        .arg(&fasta_path)
        .arg("-w")
        .arg("8")
        .arg("-t")
        .arg("2")
        .arg("-o")
        .arg(&output_path)
        .arg("-s")
        .arg(&summary_path)
        .assert()
        .success()
        .stderr(str::contains("mode: stats"));

    let tsv = fs::read_to_string(&output_path).unwrap();
    let rows: Vec<&str> = tsv.lines().collect();
    // Windows start at 0, 5, 10 for each 12 bp record
    assert_eq!(rows.len(), 1 + 6);
    assert_eq!(rows[1], "a\t0\t8\t6\t6\t0\t0");
    assert_eq!(rows[4], "b\t0\t8\t6\t0\t1\t4");

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["k"], 3);
    assert_eq!(summary["windows"], 6);
    assert_eq!(summary["sequence_count"], 2);
}

#[test]
fn test_stats_window_not_larger_than_k() {
    let temp_dir = tempdir().unwrap();
    let index_path = temp_dir.path().join("ref.kdb");
    let fasta_path = temp_dir.path().join("ref.fa");
    write_index(&index_path, 5, &["ACGTA"]);
    fs::write(&fasta_path, ">s\nACGTACGTACGT\n").unwrap();

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("stats")
        .arg(&index_path)
        .arg(&fasta_path)
        .arg("-w")
        .arg("5")
        .assert()
        .failure()
        .stderr(str::contains("Configuration error"));
}

#[test]
fn test_stats_missing_index() {
    let temp_dir = tempdir().unwrap();
    let fasta_path = temp_dir.path().join("ref.fa");
    fs::write(&fasta_path, ">s\nACGT\n").unwrap();

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("stats")
        .arg(temp_dir.path().join("missing.kdb"))
        .arg(&fasta_path)
        .assert()
        .failure()
        .stderr(str::contains("Index error"));
}

#[test]
fn test_map() {
    let temp_dir = tempdir().unwrap();
    let index_path = temp_dir.path().join("ref.kdb");
    let fasta_path = temp_dir.path().join("ref.fa");
    write_index(&index_path, 3, &["ACA"]);
    fs::write(&fasta_path, ">s1\nAAACAGAAAA\n>s2\nGG\n").unwrap();

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("map")
        .arg(&index_path)
        .arg(&fasta_path)
        .arg("-q")
        .assert()
        .success()
        .stdout("s1\n0,0,1,1,1,0,0,0,0,0\ns2\n0,0\n");
}

#[test]
fn test_intersect() {
    let temp_dir = tempdir().unwrap();
    let a = temp_dir.path().join("a.kdb");
    let b = temp_dir.path().join("b.kdb");
    write_index(&a, 4, &["AAAA", "ACGT", "CCCC"]);
    write_index(&b, 4, &["TTTT", "GGGG", "ACGA", "CATG"]);

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("intersect")
        .arg(&a)
        .arg(&b)
        .arg("-q")
        .assert()
        .success()
        .stdout("2\n");

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("intersect")
        .arg(&b)
        .arg(&a)
        .arg("-q")
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_intersect_k_mismatch() {
    let temp_dir = tempdir().unwrap();
    let a = temp_dir.path().join("a.kdb");
    let b = temp_dir.path().join("b.kdb");
    write_index(&a, 4, &["AAAA"]);
    write_index(&b, 5, &["AAAAA"]);

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("intersect")
        .arg(&a)
        .arg(&b)
        .assert()
        .failure()
        .stderr(str::contains("K-mer lengths do not match"));
}

#[test]
fn test_index_info() {
    let temp_dir = tempdir().unwrap();
    let index_path = temp_dir.path().join("ref.kdb");
    write_index(&index_path, 7, &["ACGTACG", "TTTTTTT"]);

    let mut cmd = Command::cargo_bin("fastibs").unwrap();
    cmd.arg("index")
        .arg("info")
        .arg(&index_path)
        .assert()
        .success()
        .stderr(str::contains("K-mer length (k): 7"))
        .stderr(str::contains("Distinct k-mer count: 2"));
}
