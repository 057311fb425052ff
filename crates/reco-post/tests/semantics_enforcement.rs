use proptest::prelude::*;
use reco_core::{DomainTables, Event, Interaction, InteractionId, Particle, ParticleId, Pid, RecoError, Shape};
use reco_post::{ParticleSemanticsProcessor, PostProcessor, SemanticsOpts};

const TOLERANCE: f64 = 1e-9;

fn make_particle(id: u64, shape: Shape, pid_scores: Vec<f64>, primary_scores: Vec<f64>) -> Particle {
    let mut particle = Particle::new(ParticleId::from_raw(id), shape);
    particle.pid_scores = pid_scores;
    particle.primary_scores = primary_scores;
    particle
}

fn single_interaction_event(particles: Vec<Particle>) -> Event {
    let ids = particles.iter().map(|p| p.id).collect();
    Event::new(particles, vec![Interaction::new(InteractionId::from_raw(0), ids)])
}

#[test]
fn shower_keeps_only_electromagnetic_classes() {
    let tables = DomainTables::standard();
    let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
    let mut event = single_interaction_event(vec![make_particle(
        0,
        Shape::Shower,
        vec![0.1, 0.3, 0.4, 0.1, 0.1, 0.0],
        vec![0.4, 0.6],
    )]);

    let outcome = processor.process(&mut event).expect("process");
    assert!(outcome.is_empty());

    let p = &event.particles[0];
    assert!((p.pid_scores[0] - 0.25).abs() < TOLERANCE);
    assert!((p.pid_scores[1] - 0.75).abs() < TOLERANCE);
    assert!(p.pid_scores[2..].iter().all(|s| *s == 0.0));
    assert_eq!(p.pid, Pid::Electron.label());
    assert!((p.primary_scores[0] - 0.4).abs() < TOLERANCE);
    assert!((p.primary_scores[1] - 0.6).abs() < TOLERANCE);
    assert!(p.is_primary);
}

#[test]
fn michel_electrons_become_secondary_electrons() {
    let tables = DomainTables::standard();
    let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
    let mut event = single_interaction_event(vec![make_particle(
        0,
        Shape::Michel,
        vec![0.2, 0.2, 0.6, 0.0, 0.0, 0.0],
        vec![0.3, 0.7],
    )]);

    processor.process(&mut event).expect("process");
    let p = &event.particles[0];
    assert_eq!(p.pid_scores, vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(p.primary_scores, vec![1.0, 0.0]);
    assert_eq!(p.pid, Pid::Electron.label());
    assert!(!p.is_primary);
    assert_eq!(event.interactions[0].summary.num_primaries, 0);
    assert_eq!(event.interactions[0].summary.particle_counts[Pid::Electron.index()], 1);
}

#[test]
fn disabled_flags_leave_vectors_untouched() {
    let tables = DomainTables::standard();
    let opts = SemanticsOpts {
        enforce_pid: false,
        enforce_primary: true,
    };
    let processor = ParticleSemanticsProcessor::new(&tables, opts);
    let scores = vec![0.2, 0.2, 0.6, 0.0, 0.0, 0.0];
    let mut event = single_interaction_event(vec![make_particle(0, Shape::Delta, scores.clone(), vec![0.5, 0.5])]);

    processor.process(&mut event).expect("process");
    assert_eq!(event.particles[0].pid_scores, scores);
    assert_eq!(event.particles[0].primary_scores, vec![1.0, 0.0]);
}

#[test]
fn disabled_primary_flag_keeps_primary_prediction() {
    let tables = DomainTables::standard();
    let opts = SemanticsOpts {
        enforce_pid: true,
        enforce_primary: false,
    };
    let processor = ParticleSemanticsProcessor::new(&tables, opts);
    let mut delta = make_particle(0, Shape::Delta, vec![0.5, 0.3, 0.2, 0.0, 0.0, 0.0], vec![0.3, 0.7]);
    delta.is_primary = true;
    let mut event = single_interaction_event(vec![delta]);

    processor.process(&mut event).expect("process");
    let p = &event.particles[0];
    assert_eq!(p.pid_scores, vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(p.pid, Pid::Electron.label());
    assert_eq!(p.primary_scores, vec![0.3, 0.7]);
    assert!(p.is_primary);
    assert_eq!(event.interactions[0].summary.primary_counts[Pid::Electron.index()], 1);
}

#[test]
fn empty_score_vectors_are_left_alone() {
    let tables = DomainTables::standard();
    let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
    let mut event = single_interaction_event(vec![
        make_particle(0, Shape::Track, Vec::new(), Vec::new()),
        make_particle(1, Shape::Michel, vec![0.2, 0.8, 0.0, 0.0, 0.0, 0.0], Vec::new()),
    ]);

    processor.process(&mut event).expect("process");
    assert!(event.particles[0].pid_scores.is_empty());
    assert!(event.particles[0].primary_scores.is_empty());
    assert!(!event.particles[0].is_pid_determined());
    assert_eq!(event.particles[1].pid, Pid::Electron.label());
    assert!(event.particles[1].primary_scores.is_empty());
    assert_eq!(event.interactions[0].summary.unknown_count, 1);
}

#[test]
fn negative_allowed_scores_are_normalization_errors() {
    let tables = DomainTables::standard();
    let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
    let mut event = single_interaction_event(vec![make_particle(
        0,
        Shape::Shower,
        vec![-0.2, 1.2, 0.0, 0.0, 0.0, 0.0],
        vec![0.5, 0.5],
    )]);

    let err = processor.process(&mut event).unwrap_err();
    assert!(matches!(err, RecoError::Normalization(_)));
    assert_eq!(err.info().code, "negative-score");
    assert_eq!(err.info().context.get("field").map(String::as_str), Some("pid_scores"));
}

#[test]
fn short_score_vectors_drop_out_of_range_classes() {
    let tables = DomainTables::standard();
    let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
    // Five classes only: no kaon entry.
    let mut event = single_interaction_event(vec![make_particle(
        0,
        Shape::Track,
        vec![0.5, 0.0, 0.25, 0.0, 0.25],
        vec![0.9, 0.1],
    )]);

    processor.process(&mut event).expect("process");
    let p = &event.particles[0];
    assert_eq!(p.pid_scores.len(), 5);
    assert!((p.pid_scores[2] - 0.5).abs() < TOLERANCE);
    assert!((p.pid_scores[4] - 0.5).abs() < TOLERANCE);
    assert_eq!(p.pid_scores[0], 0.0);
}

#[test]
fn zero_surviving_mass_fails_loudly() {
    let tables = DomainTables::standard();
    let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
    let mut event = single_interaction_event(vec![make_particle(
        0,
        Shape::Track,
        vec![0.7, 0.3, 0.0, 0.0, 0.0, 0.0],
        vec![0.5, 0.5],
    )]);

    let err = processor.process(&mut event).unwrap_err();
    assert!(matches!(err, RecoError::Normalization(_)));
    assert_eq!(err.info().code, "zero-mass");
    assert_eq!(err.info().context.get("particle").map(String::as_str), Some("0"));
    assert_eq!(err.info().context.get("field").map(String::as_str), Some("pid_scores"));
}

#[test]
fn unsupported_shapes_are_domain_errors() {
    let tables = DomainTables::standard();
    let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
    let mut event = single_interaction_event(vec![make_particle(
        0,
        Shape::LowEnergy,
        vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0],
        vec![0.5, 0.5],
    )]);
    let err = processor.process(&mut event).unwrap_err();
    assert!(matches!(err, RecoError::Domain(_)));
}

fn scores(len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.01f64..1.0, len).prop_map(|raw| {
        let total: f64 = raw.iter().sum();
        raw.into_iter().map(|v| v / total).collect()
    })
}

fn shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Shower),
        Just(Shape::Track),
        Just(Shape::Michel),
        Just(Shape::Delta),
    ]
}

proptest! {
    #[test]
    fn enforced_scores_are_distributions_over_allowed_classes(
        shape in shape(),
        pid_scores in scores(Pid::COUNT),
        primary_scores in scores(2),
    ) {
        let tables = DomainTables::standard();
        let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
        let mut event = single_interaction_event(vec![make_particle(0, shape, pid_scores, primary_scores)]);
        processor.process(&mut event).unwrap();

        let p = &event.particles[0];
        let allowed_pid = tables.allowed_pid_indices(shape).unwrap();
        let allowed_primary = tables.allowed_primary_indices(shape).unwrap();
        for (idx, score) in p.pid_scores.iter().enumerate() {
            prop_assert!(*score >= 0.0);
            if !allowed_pid.contains(&idx) {
                prop_assert_eq!(*score, 0.0);
            }
        }
        for (idx, score) in p.primary_scores.iter().enumerate() {
            if !allowed_primary.contains(&idx) {
                prop_assert_eq!(*score, 0.0);
            }
        }
        prop_assert!((p.pid_scores.iter().sum::<f64>() - 1.0).abs() < TOLERANCE);
        prop_assert!((p.primary_scores.iter().sum::<f64>() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn enforcement_is_idempotent(
        shape in shape(),
        pid_scores in scores(Pid::COUNT),
        primary_scores in scores(2),
    ) {
        let tables = DomainTables::standard();
        let processor = ParticleSemanticsProcessor::new(&tables, SemanticsOpts::default());
        let mut event = single_interaction_event(vec![make_particle(0, shape, pid_scores, primary_scores)]);
        processor.process(&mut event).unwrap();
        let once = event.clone();
        processor.process(&mut event).unwrap();

        let (a, b) = (&once.particles[0], &event.particles[0]);
        prop_assert_eq!(a.pid, b.pid);
        prop_assert_eq!(a.is_primary, b.is_primary);
        for (x, y) in a.pid_scores.iter().zip(&b.pid_scores) {
            prop_assert!((x - y).abs() < TOLERANCE);
        }
        for (x, y) in a.primary_scores.iter().zip(&b.primary_scores) {
            prop_assert!((x - y).abs() < TOLERANCE);
        }
        prop_assert_eq!(&once.interactions, &event.interactions);
    }
}
