use reco_core::{DomainTables, Event, Interaction, InteractionId, Particle, ParticleId, Pid, RecoError, Shape};
use reco_post::{
    assign_pid, ParticlePropertiesProcessor, PidThresholds, PostProcessingConfig, PostProcessor,
    ThresholdOpts,
};

fn thresholds(entries: &[(Pid, f64)]) -> PidThresholds {
    entries.iter().copied().collect()
}

fn track(id: u64, pid_scores: Vec<f64>) -> Particle {
    let mut particle = Particle::new(ParticleId::from_raw(id), Shape::Track);
    particle.pid_scores = pid_scores;
    particle.primary_scores = vec![0.5, 0.5];
    particle
}

fn event_of(particles: Vec<Particle>) -> Event {
    let ids = particles.iter().map(|p| p.id).collect();
    Event::new(particles, vec![Interaction::new(InteractionId::from_raw(0), ids)])
}

#[test]
fn later_thresholds_see_conditional_probabilities() {
    let map = thresholds(&[(Pid::Muon, 0.8), (Pid::Pion, 0.5), (Pid::Proton, 0.0)]);
    let scores = [0.0, 0.0, 0.3, 0.6, 0.1, 0.0];
    assert_eq!(assign_pid(&scores, &map).expect("assigned"), Pid::Pion);
}

#[test]
fn first_passing_entry_wins() {
    let map = thresholds(&[(Pid::Proton, 0.1), (Pid::Muon, 0.0)]);
    let scores = [0.0, 0.0, 0.8, 0.0, 0.2, 0.0];
    assert_eq!(assign_pid(&scores, &map).expect("assigned"), Pid::Proton);
}

#[test]
fn exhausted_walk_is_a_coverage_error() {
    let map = thresholds(&[(Pid::Muon, 0.8), (Pid::Pion, 0.9)]);
    let scores = [0.0, 0.0, 0.3, 0.6, 0.1, 0.0];
    let err = assign_pid(&scores, &map).unwrap_err();
    assert!(matches!(err, RecoError::Coverage(_)));
    assert_eq!(err.info().code, "uncovered-particle");
}

#[test]
fn rejecting_a_certain_class_is_a_coverage_error() {
    let map = thresholds(&[(Pid::Muon, 1.5), (Pid::Pion, 0.0)]);
    let scores = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    let err = assign_pid(&scores, &map).unwrap_err();
    assert_eq!(err.info().code, "exhausted-mass");
}

#[test]
fn classes_past_the_score_vector_are_missing_data() {
    let map = thresholds(&[(Pid::Kaon, 0.5), (Pid::Muon, 0.0)]);
    let err = assign_pid(&[0.0, 0.0, 0.5, 0.5, 0.0], &map).unwrap_err();
    assert!(matches!(err, RecoError::MissingData(_)));
}

#[test]
fn construction_requires_something_to_do() {
    let tables = DomainTables::standard();
    let err = ParticlePropertiesProcessor::new(&tables, ThresholdOpts::default()).unwrap_err();
    assert!(matches!(err, RecoError::Config(_)));
    assert_eq!(err.info().code, "nothing-to-adjust");

    let opts = ThresholdOpts {
        track_pid_thresholds: thresholds(&[(Pid::Muon, f64::NAN)]),
        ..ThresholdOpts::default()
    };
    assert!(ParticlePropertiesProcessor::new(&tables, opts).is_err());
}

#[test]
fn processor_assigns_track_and_em_pids_separately() {
    let tables = DomainTables::standard();
    let opts = ThresholdOpts {
        em_pid_thresholds: thresholds(&[(Pid::Photon, 0.6), (Pid::Electron, 0.0)]),
        track_pid_thresholds: thresholds(&[(Pid::Muon, 0.8), (Pid::Pion, 0.5), (Pid::Proton, 0.0)]),
        primary_threshold: None,
    };
    let processor = ParticlePropertiesProcessor::new(&tables, opts).expect("processor");

    let mut shower = Particle::new(ParticleId::from_raw(1), Shape::Shower);
    shower.pid_scores = vec![0.55, 0.45, 0.0, 0.0, 0.0, 0.0];
    shower.pid = Pid::Photon.label();
    let mut event = event_of(vec![track(0, vec![0.0, 0.0, 0.3, 0.6, 0.1, 0.0]), shower]);

    processor.process(&mut event).expect("process");
    assert_eq!(event.particles[0].pid, Pid::Pion.label());
    assert_eq!(event.particles[1].pid, Pid::Electron.label());
    assert_eq!(event.interactions[0].summary.particle_counts[Pid::Pion.index()], 1);
    assert_eq!(event.interactions[0].summary.particle_counts[Pid::Electron.index()], 1);
}

#[test]
fn shapes_without_thresholds_keep_their_pid() {
    let tables = DomainTables::standard();
    let opts = ThresholdOpts {
        em_pid_thresholds: thresholds(&[(Pid::Photon, 0.5), (Pid::Electron, 0.0)]),
        ..ThresholdOpts::default()
    };
    let processor = ParticlePropertiesProcessor::new(&tables, opts).expect("processor");
    let mut particle = track(0, vec![0.0, 0.0, 0.9, 0.1, 0.0, 0.0]);
    particle.pid = Pid::Muon.label();
    let mut event = event_of(vec![particle]);
    processor.process(&mut event).expect("process");
    assert_eq!(event.particles[0].pid, Pid::Muon.label());
}

#[test]
fn primary_threshold_overrides_previous_flag() {
    let tables = DomainTables::standard();
    let run = |threshold: f64, prior: bool| {
        let opts = ThresholdOpts {
            primary_threshold: Some(threshold),
            ..ThresholdOpts::default()
        };
        let processor = ParticlePropertiesProcessor::new(&tables, opts).expect("processor");
        let mut particle = track(0, vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        particle.primary_scores = vec![0.2, 0.8];
        particle.is_primary = prior;
        let mut event = event_of(vec![particle]);
        processor.process(&mut event).expect("process");
        (event.particles[0].is_primary, event.interactions[0].summary.num_primaries)
    };
    assert_eq!(run(0.5, false), (true, 1));
    assert_eq!(run(0.9, true), (false, 0));
}

#[test]
fn coverage_failures_name_the_particle() {
    let tables = DomainTables::standard();
    let opts = ThresholdOpts {
        track_pid_thresholds: thresholds(&[(Pid::Muon, 0.8), (Pid::Pion, 0.9)]),
        ..ThresholdOpts::default()
    };
    let processor = ParticlePropertiesProcessor::new(&tables, opts).expect("processor");
    let mut event = event_of(vec![track(0, vec![0.0, 0.0, 0.3, 0.6, 0.1, 0.0])]);
    let err = processor.process(&mut event).unwrap_err();
    assert!(matches!(err, RecoError::Coverage(_)));
    assert_eq!(err.info().context.get("particle").map(String::as_str), Some("0"));
}

#[test]
fn yaml_order_is_walk_order() {
    let yaml = r#"
adjust_particle_properties:
  track_pid_thresholds:
    proton: 0.3
    kaon: 0.9
    muon: 0.0
  primary_threshold: 0.4
"#;
    let config = PostProcessingConfig::from_yaml_str(yaml).expect("config");
    let opts = config.adjust_particle_properties.expect("section");
    let order: Vec<Pid> = opts.track_pid_thresholds.keys().copied().collect();
    assert_eq!(order, vec![Pid::Proton, Pid::Kaon, Pid::Muon]);
    assert_eq!(opts.primary_threshold, Some(0.4));
    assert!(opts.em_pid_thresholds.is_empty());
}
