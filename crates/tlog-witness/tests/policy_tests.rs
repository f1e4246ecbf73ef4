use rstest::rstest;
use tlog_crypto::{sign_checkpoint, KeyAlgorithm, Keyring, NoteSigner};
use tlog_types::{Checkpoint, NoteSignature, Sha256Hash, SignedCheckpoint};
use tlog_witness::{Error, PolicyNode, WitnessPolicy};

const LOG_VKEY: &str = "example.com/log+58490f8b+ARl/ayPhbIUyxqvIOPrNXqeJvgx2spIDNAOb+os9No1h";

fn witness(name: &str, seed: u8) -> NoteSigner {
    NoteSigner::from_seed(name, KeyAlgorithm::CosignatureV1, [seed; 32]).unwrap()
}

fn witnesses() -> [NoteSigner; 3] {
    [
        witness("a.example", 1),
        witness("b.example", 2),
        witness("c.example", 3),
    ]
}

fn two_of_three_policy() -> WitnessPolicy {
    let [a, b, c] = witnesses();
    let text = format!(
        "# two of three witnesses\n\
         log {LOG_VKEY} https://log.example/\n\
         \n\
         witness A {} https://a.example/\n\
         witness B {}\n\
         witness C {}\n\
         group majority 2 A B C\n\
         quorum majority\n",
        a.verifier().unwrap(),
        b.verifier().unwrap(),
        c.verifier().unwrap(),
    );
    WitnessPolicy::parse(&text).unwrap()
}

fn note() -> SignedCheckpoint {
    let log = NoteSigner::from_seed("example.com/log", KeyAlgorithm::Ed25519, [42; 32]).unwrap();
    let checkpoint = Checkpoint::new("example.com/log", 10, Sha256Hash::from_bytes([3; 32]));
    sign_checkpoint(checkpoint, &log).unwrap()
}

fn cosigned_by(signers: &[&NoteSigner]) -> SignedCheckpoint {
    let mut note = note();
    for signer in signers {
        let sig = signer.cosign_at(&note.checkpoint, 1_700_000_000).unwrap();
        note.signatures.push(sig);
    }
    note
}

#[test]
fn test_parse_policy() {
    let policy = two_of_three_policy();
    assert_eq!(policy.logs().len(), 1);
    assert_eq!(policy.logs()[0].verifier.name(), "example.com/log");
    assert_eq!(
        policy.logs()[0].url.as_ref().map(|u| u.as_str()),
        Some("https://log.example/")
    );
    assert_eq!(policy.witnesses().count(), 3);
    assert!(policy.witness("A").unwrap().url.is_some());
    assert!(policy.witness("B").unwrap().url.is_none());
    assert_eq!(policy.keyring().len(), 3);

    match policy.quorum().unwrap() {
        PolicyNode::Threshold {
            name,
            required,
            children,
        } => {
            assert_eq!(name, "majority");
            assert_eq!(*required, 2);
            assert_eq!(children.len(), 3);
        }
        other => panic!("unexpected quorum {:?}", other),
    }
}

#[rstest]
#[case::a_and_b(&[0, 1], true)]
#[case::a_and_c(&[0, 2], true)]
#[case::all_three(&[0, 1, 2], true)]
#[case::only_a(&[0], false)]
#[case::none(&[], false)]
fn test_two_of_three(#[case] signers: &[usize], #[case] expected: bool) {
    let all = witnesses();
    let chosen: Vec<&NoteSigner> = signers.iter().map(|i| &all[*i]).collect();
    assert_eq!(two_of_three_policy().satisfied(&cosigned_by(&chosen)), expected);
}

#[test]
fn test_forged_cosignature_is_ignored() {
    let [a, _, c] = witnesses();
    let mut note = cosigned_by(&[&a, &c]);
    // Corrupt C's signature; it still claims C's name and key hash
    let forged = note.signatures.last_mut().unwrap();
    forged.signature[20] ^= 0xff;

    let policy = two_of_three_policy();
    assert!(!policy.satisfied(&note));
    assert_eq!(policy.verified_witnesses(&note, policy.keyring()).len(), 1);
}

#[test]
fn test_repeated_witness_counts_once() {
    let [a, _, _] = witnesses();
    let mut note = cosigned_by(&[&a]);
    let again = a.cosign_at(&note.checkpoint, 1_700_000_001).unwrap();
    note.signatures.push(again);
    assert!(!two_of_three_policy().satisfied(&note));
}

#[test]
fn test_cosignature_over_other_checkpoint() {
    let [a, b, _] = witnesses();
    let other = Checkpoint::new("example.com/log", 11, Sha256Hash::from_bytes([4; 32]));
    let mut note = cosigned_by(&[&a]);
    note.signatures.push(b.cosign_at(&other, 1_700_000_000).unwrap());
    assert!(!two_of_three_policy().satisfied(&note));
}

#[test]
fn test_unknown_witness_is_ignored() {
    let [a, _, _] = witnesses();
    let stranger = witness("d.example", 4);
    let note = cosigned_by(&[&a, &stranger]);
    assert!(!two_of_three_policy().satisfied(&note));
}

#[test]
fn test_external_key_lookup() {
    let [a, b, _] = witnesses();
    let note = cosigned_by(&[&a, &b]);
    let policy = two_of_three_policy();

    // A lookup that only knows A cannot confirm B
    let only_a: Keyring = [a.verifier().unwrap()].into_iter().collect();
    assert!(!policy.satisfied_with(&note, &only_a));
    assert!(policy.satisfied_with(&note, policy.keyring()));
}

#[test]
fn test_quorum_none() {
    let policy = WitnessPolicy::parse("# nothing required\nquorum none\n").unwrap();
    assert!(policy.quorum().is_none());
    assert!(policy.satisfied(&note()));
    assert!(WitnessPolicy::none().satisfied(&note()));
}

#[test]
fn test_single_witness_quorum() {
    let [a, b, _] = witnesses();
    let policy: WitnessPolicy = format!("witness A {}\nquorum A\n", a.verifier().unwrap())
        .parse()
        .unwrap();
    assert!(policy.satisfied(&cosigned_by(&[&a])));
    assert!(!policy.satisfied(&cosigned_by(&[&b])));
}

#[test]
fn test_nested_groups() {
    let [a, b, c] = witnesses();
    let text = format!(
        "witness A {}\nwitness B {}\nwitness C {}\n\
         group either any A B\n\
         group both all either C\n\
         quorum both\n",
        a.verifier().unwrap(),
        b.verifier().unwrap(),
        c.verifier().unwrap(),
    );
    let policy = WitnessPolicy::parse(&text).unwrap();
    assert!(policy.satisfied(&cosigned_by(&[&b, &c])));
    assert!(!policy.satisfied(&cosigned_by(&[&a, &b])));
}

#[test]
fn test_log_key_listed_as_witness_counts() {
    let log = NoteSigner::from_seed("example.com/log", KeyAlgorithm::Ed25519, [42; 32]).unwrap();
    let policy: WitnessPolicy = format!("witness L {}\nquorum L\n", log.verifier().unwrap())
        .parse()
        .unwrap();
    // Listing the log key as a witness is allowed; its signature then counts
    assert!(policy.satisfied(&note()));

    let mut unsigned = note();
    unsigned.signatures.clear();
    unsigned.signatures.push(NoteSignature {
        name: "example.com/log".to_string(),
        key_hash: [0; 4],
        signature: vec![1; 64],
    });
    assert!(!policy.satisfied(&unsigned));
}

#[rstest]
#[case::unknown_keyword("frobnicate x\nquorum none\n")]
#[case::two_quorums("quorum none\nquorum none\n")]
#[case::undefined_quorum("quorum ghost\n")]
#[case::undefined_member("group g any ghost\nquorum g\n")]
#[case::quorum_arguments("quorum\n")]
#[case::bad_log_key("log not-a-key\nquorum none\n")]
#[case::witness_without_key("witness A\nquorum none\n")]
fn test_rejects_invalid_policies(#[case] text: &str) {
    assert!(WitnessPolicy::parse(text).is_err(), "{:?} should not parse", text);
}

#[test]
fn test_rejects_structural_errors() {
    let [a, b, _] = witnesses();
    let (va, vb) = (a.verifier().unwrap(), b.verifier().unwrap());

    let cases = [
        // duplicate name
        format!("witness A {va}\nwitness A {vb}\nquorum A\n"),
        // group defined after use
        format!("witness A {va}\nquorum g\ngroup g any A\n"),
        // threshold above member count
        format!("witness A {va}\nwitness B {vb}\ngroup g 3 A B\nquorum g\n"),
        // zero threshold
        format!("witness A {va}\ngroup g 0 A\nquorum g\n"),
        // non-numeric threshold
        format!("witness A {va}\ngroup g most A\nquorum g\n"),
        // group without members
        "group g any\nquorum none\n".to_string(),
        // duplicate member
        format!("witness A {va}\ngroup g 2 A A\nquorum g\n"),
        // reserved name
        format!("witness none {va}\nquorum none\n"),
        // same key twice
        format!("witness A {va}\nwitness B {va}\nquorum A\n"),
        // witnesses but no quorum
        format!("witness A {va}\nwitness B {vb}\n"),
    ];
    for text in cases {
        assert!(WitnessPolicy::parse(&text).is_err(), "{:?} should not parse", text);
    }
}

#[rstest]
#[case::empty("")]
#[case::blank_lines("\n\n  \n")]
#[case::only_comments("# no witnesses yet\n# see the log operator\n")]
fn test_empty_policy_requires_nothing(#[case] text: &str) {
    let policy = WitnessPolicy::parse(text).unwrap();
    assert!(policy.quorum().is_none());
    assert_eq!(policy.witnesses().count(), 0);
    assert!(policy.satisfied(&note()));
}

#[test]
fn test_log_without_quorum_is_rejected() {
    let err = WitnessPolicy::parse(&format!("log {LOG_VKEY}\n")).unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));
}

#[test]
fn test_invalid_witness_url() {
    let [a, _, _] = witnesses();
    let text = format!("witness A {} not-a-url\nquorum A\n", a.verifier().unwrap());
    match WitnessPolicy::parse(&text).unwrap_err() {
        Error::Syntax { line, message } => {
            assert_eq!(line, 1);
            assert!(message.starts_with("invalid url not-a-url"), "{}", message);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_error_reports_line_number() {
    let err = WitnessPolicy::parse("# header\n\nquorum none\nbogus\n").unwrap_err();
    match err {
        Error::Syntax { line, .. } => assert_eq!(line, 4),
        other => panic!("unexpected error {:?}", other),
    }
}
