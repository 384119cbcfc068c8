// Integration tests for cohort
use cohort::prelude::*;
use cohort::{
    ClusterConfig, FeatureEncoder, HobbyEmbeddings, KMeans, ModelVersion, PersonalityTable,
    PersonalityType, RefitWorker, Scorer,
};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

fn full_profile(id: &str) -> UserProfile {
    UserProfile::new(id)
        .with_hometown("Tokyo")
        .with_field("finance")
        .with_role("SE")
        .with_personality_type("INTJ")
        .with_alma_mater("Keio")
        .with_hobbies(["reading", "travel"])
}

fn synthetic_population() -> Vec<UserProfile> {
    let groups = [
        ("Tokyo", "finance", "SE", "soccer"),
        ("Osaka", "retail", "sales", "piano"),
        ("Sapporo", "media", "designer", "skiing"),
    ];
    let mut profiles = Vec::new();
    for (g, (town, field, role, hobby)) in groups.iter().enumerate() {
        for i in 0..3 {
            profiles.push(
                UserProfile::new(format!("g{}-{}", g, i))
                    .with_hometown(*town)
                    .with_field(*field)
                    .with_role(*role)
                    .with_hobbies([*hobby]),
            );
        }
    }
    profiles
}

#[test]
fn test_equality_subscores_symmetric() {
    let scorer = Scorer::default();
    let pairs = [
        (full_profile("a"), full_profile("b").with_hometown("Osaka")),
        (
            full_profile("a").with_preferences([Attribute::Field, Attribute::Hometown]),
            UserProfile::new("b").with_field("finance"),
        ),
        (UserProfile::new("a"), full_profile("b")),
    ];

    for (a, b) in &pairs {
        let ab = scorer.score(a, b);
        let ba = scorer.score(b, a);
        for attribute in [
            Attribute::Hometown,
            Attribute::Field,
            Attribute::Role,
            Attribute::AlmaMater,
        ] {
            assert_eq!(ab.raw(attribute), ba.raw(attribute));
        }
    }
}

#[test]
fn test_identical_profiles_reach_maximum_outside_best_matches() {
    let scorer = Scorer::default();
    let table = PersonalityTable::default();
    let target = full_profile("t").with_preferences([Attribute::Role]);
    let twin = full_profile("twin").with_preferences([Attribute::Role]);
    let best = scorer.score(&target, &twin).aggregate;
    assert_eq!(best, 6.3);

    let mut others = vec![
        full_profile("x").with_hometown("Osaka"),
        full_profile("y").with_hobbies(["reading"]),
        full_profile("z").with_hobbies(["reading", "travel", "movies"]),
        UserProfile::new("empty"),
    ];
    // every personality type the target does not list as a best match
    for personality in PersonalityType::ALL {
        if !table.is_best_match(PersonalityType::Intj, personality) {
            others.push(full_profile("p").with_personality_type(personality.as_str()));
        }
    }
    for other in &others {
        assert!(scorer.score(&target, other).aggregate <= best);
    }

    // a listed best match (1.0) outranks a shared type (0.8)
    for personality in table.best_matches(PersonalityType::Intj) {
        let variant = full_profile("bm").with_personality_type(personality.as_str());
        let score = scorer.score(&target, &variant).aggregate;
        assert!(score > best);
        assert_eq!(score, 6.5);
    }
}

#[test]
fn test_personality_examples() {
    let scorer = Scorer::default();
    let target = UserProfile::new("t").with_personality_type("INTJ");
    let score_for = |mbti: &str| {
        scorer
            .score(&target, &UserProfile::new("c").with_personality_type(mbti))
            .raw(Attribute::PersonalityType)
    };

    assert_eq!(score_for("INTJ"), 0.8);
    assert_eq!(score_for("ESFJ"), 1.0);
    assert_eq!(score_for("ESTP"), 0.0);
}

#[test]
fn test_personality_direction_is_preserved() {
    let table = PersonalityTable::default();
    assert!(table.is_best_match(PersonalityType::Intj, PersonalityType::Esfj));
    assert!(!table.is_best_match(PersonalityType::Esfj, PersonalityType::Intj));

    let scorer = Scorer::default();
    let intj = UserProfile::new("a").with_personality_type("INTJ");
    let esfj = UserProfile::new("b").with_personality_type("ESFJ");
    assert_ne!(
        scorer.score(&intj, &esfj).aggregate,
        scorer.score(&esfj, &intj).aggregate
    );
}

#[test]
fn test_hobby_containment_and_weighting_examples() {
    let scorer = Scorer::default();
    let target = UserProfile::new("t")
        .with_hobbies(["reading", "travel"])
        .with_personality_type("INTJ")
        .with_preferences([Attribute::PersonalityType]);
    let candidate = UserProfile::new("c")
        .with_hobbies(["reading", "movies"])
        .with_personality_type("INTJ");

    let score = scorer.score(&target, &candidate);
    assert_eq!(score.raw(Attribute::Hobbies), 0.5);
    assert!((score.contribution(Attribute::PersonalityType) - 1.2).abs() < 1e-6);
    assert_eq!(score.aggregate, 1.7);
}

#[test]
fn test_rank_length_and_order() {
    let engine = Engine::init(EngineConfig::default()).unwrap();
    let target = full_profile("target");
    let candidates: Vec<UserProfile> = (0..12)
        .map(|i| {
            let mut p = UserProfile::new(format!("c{:02}", i));
            if i % 2 == 0 {
                p = p.with_hometown("Tokyo");
            }
            if i % 3 == 0 {
                p = p.with_role("SE");
            }
            p
        })
        .collect();

    for k in [0, 1, 5, 12, 20] {
        let ranked = engine.rank(&target, &candidates, Some(k));
        assert_eq!(ranked.len(), k.min(candidates.len()));
        for pair in ranked.windows(2) {
            assert!(pair[0].aggregate_score >= pair[1].aggregate_score);
            if pair[0].aggregate_score == pair[1].aggregate_score {
                assert!(pair[0].candidate_id < pair[1].candidate_id);
            }
        }
    }

    assert_eq!(engine.rank(&target, &candidates, None).len(), 5);
    let first = engine.rank(&target, &candidates, Some(12));
    let second = engine.rank(&target, &candidates, Some(12));
    assert_eq!(first, second);
    assert_eq!(first[0].candidate_id.as_str(), "c00");
}

#[test]
fn test_fit_assign_self_consistency() {
    let profiles = synthetic_population();
    let schema = FeatureEncoder::default().fit(&profiles).unwrap();
    let matrix = schema.encode_batch(&profiles);
    let fit = KMeans::default().fit(&matrix, ModelVersion::new(1)).unwrap();

    for (profile, label) in profiles.iter().zip(&fit.labels) {
        assert_eq!(fit.model.assign(&schema.encode(profile)).unwrap(), *label);
    }
}

#[test]
fn test_nine_profiles_three_clusters() {
    let engine = Engine::init(EngineConfig::default()).unwrap();
    let assignments = engine.fit_population(&synthetic_population()).unwrap();

    let labels: HashSet<usize> = assignments.iter().map(|a| a.cluster_label.index()).collect();
    assert_eq!(labels, HashSet::from([0, 1, 2]));
    for group in assignments.chunks(3) {
        assert!(group.iter().all(|a| a.cluster_label == group[0].cluster_label));
    }
}

#[test]
fn test_small_population_single_label() {
    let engine = Engine::init(EngineConfig::default()).unwrap();
    let profiles = vec![full_profile("a"), UserProfile::new("b").with_role("PM")];
    let assignments = engine.fit_population(&profiles).unwrap();

    assert!(assignments
        .iter()
        .all(|a| a.cluster_label == ClusterLabel::new(0)));
    let newcomer = engine.assign(&UserProfile::new("c")).unwrap();
    assert_eq!(newcomer.cluster_label, ClusterLabel::new(0));
}

#[test]
fn test_error_taxonomy() {
    assert!(matches!(
        FeatureEncoder::default().fit(&[]),
        Err(Error::Schema(_))
    ));
    assert!(matches!(
        KMeans::default().fit(&[], ModelVersion::new(1)),
        Err(Error::InsufficientData(_))
    ));

    let profiles = synthetic_population();
    let schema = FeatureEncoder::default().fit(&profiles).unwrap();
    let fit = KMeans::default()
        .fit(&schema.encode_batch(&profiles), ModelVersion::new(1))
        .unwrap();

    let other_schema = FeatureEncoder::default().fit(&profiles[..4]).unwrap();
    assert_ne!(schema.version(), other_schema.version());
    let foreign = other_schema.encode(&profiles[0]);
    assert!(matches!(
        fit.model.assign(&foreign),
        Err(Error::SchemaMismatch { .. })
    ));
}

#[test]
fn test_refit_keeps_readers_on_published_model() {
    let engine = Arc::new(Engine::init(EngineConfig::default()).unwrap());
    engine.fit_population(&synthetic_population()).unwrap();
    let before = engine.snapshot().unwrap();

    let worker = RefitWorker::spawn(engine.clone()).unwrap();
    let mut grown = synthetic_population();
    grown.extend((0..3).map(|i| {
        UserProfile::new(format!("g3-{}", i))
            .with_hometown("Naha")
            .with_role("PM")
    }));
    let ticket = worker.submit(grown);

    // the previously published snapshot stays valid while the refit runs
    let label = before
        .model()
        .assign(&before.schema().encode(&synthetic_population()[0]))
        .unwrap();
    assert_eq!(label, before.assignments()[0].cluster_label);

    let assignments = ticket.recv().unwrap().unwrap();
    assert_eq!(assignments.len(), 12);
    let after = engine.snapshot().unwrap();
    assert!(after.version() > before.version());
    assert_eq!(after.model().k(), 4);
    worker.shutdown();
}

#[test]
fn test_engine_from_config_files() {
    let dir = tempfile::tempdir().unwrap();

    let embeddings_path = dir.path().join("hobbies.txt");
    let mut embeddings = std::fs::File::create(&embeddings_path).unwrap();
    writeln!(embeddings, "3 2").unwrap();
    writeln!(embeddings, "soccer 1.0 0.0").unwrap();
    writeln!(embeddings, "futsal 0.9 0.1").unwrap();
    writeln!(embeddings, "piano 0.0 1.0").unwrap();

    let config_path = dir.path().join("cohort.json");
    let config = serde_json::json!({
        "encoder": {"hobby_mode": "embedding"},
        "scoring": {"top_k": 2},
        "cluster": {"group_size": 2},
        "embeddings_path": embeddings_path,
    });
    std::fs::write(&config_path, config.to_string()).unwrap();

    let config = EngineConfig::from_file(&config_path).unwrap();
    assert_eq!(config.encoder.hobby_mode, HobbyMode::Embedding);
    let engine = Engine::init(config).unwrap();

    let target = UserProfile::new("t").with_hobbies(["soccer"]);
    let pool = vec![
        UserProfile::new("a").with_hobbies(["piano"]),
        UserProfile::new("b").with_hobbies(["futsal"]),
        UserProfile::new("c").with_hobbies(["unknown"]),
    ];
    let ranked = engine.rank(&target, &pool, None);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].candidate_id.as_str(), "b");
    assert!(ranked[0].aggregate_score > 0.0);

    let mut population = pool.clone();
    population.push(target.clone());
    let assignments = engine.fit_population(&population).unwrap();
    assert_eq!(assignments.len(), 4);
    assert_eq!(engine.snapshot().unwrap().model().k(), 2);
}

#[test]
fn test_profile_records_from_json() {
    let json = r#"[
        {"user_id": "u1", "hometown": "Tokyo", "field": "finance", "role": "SE",
         "mbti": "INTJ", "alma_mater": "Keio", "hobbies": "reading, travel",
         "preferences": "mbti, hometown", "self_introductions": "hello"},
        {"user_id": "u2", "hometown": "Tokyo", "role": "SE", "mbti": "ENFP",
         "hobbies": "reading", "preferences": ""}
    ]"#;
    let records: Vec<ProfileRecord> = serde_json::from_str(json).unwrap();
    let profiles: Vec<UserProfile> = records.into_iter().map(UserProfile::from).collect();

    assert!(profiles[0].prefers(Attribute::PersonalityType));
    assert!(profiles[0].prefers(Attribute::Hometown));
    assert!(profiles[0].hobbies.contains("travel"));

    let engine = Engine::init(EngineConfig::default()).unwrap();
    let ranked = engine.rank(&profiles[0], &profiles, None);
    assert_eq!(ranked.len(), 1);
    // hometown 1.5 + role 1.0 + personality 1.5 + hobbies 0.5
    assert_eq!(ranked[0].aggregate_score, 4.5);
}

#[test]
fn test_cluster_config_override() {
    let config = EngineConfig {
        cluster: ClusterConfig {
            group_size: 9,
            ..ClusterConfig::default()
        },
        ..EngineConfig::default()
    };
    let engine = Engine::init(config).unwrap();
    engine.fit_population(&synthetic_population()).unwrap();
    assert_eq!(engine.snapshot().unwrap().model().k(), 1);

    let table = HobbyEmbeddings::from_map(
        [("soccer".to_string(), vec![1.0f32, 0.0])].into_iter().collect(),
    )
    .unwrap();
    assert_eq!(table.dim(), 2);
}
