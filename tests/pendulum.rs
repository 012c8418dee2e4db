use fuzzy_control::config::{EngineConfig, ExprConfig, RuleConfig};
use fuzzy_control::{Error, InputError, Inputs, MamdaniInference};

fn pendulum() -> EngineConfig {
    EngineConfig::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pendulum.toml")).unwrap()
}

fn state(angle: f64, angular_velocity: f64, cart_position: f64, cart_velocity: f64) -> Inputs {
    Inputs::from([
        ("angle", angle),
        ("angularVelocity", angular_velocity),
        ("cartPosition", cart_position),
        ("cartVelocity", cart_velocity),
    ])
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_loads_pendulum() {
    let engine = pendulum().build().unwrap();

    assert_eq!(engine.rules().len(), 42);
    assert_eq!(
        engine.inputs().map(|v| v.name()).collect::<Vec<_>>(),
        ["angle", "angularVelocity", "cartPosition", "cartVelocity"]
    );
    assert_eq!(engine.output().name(), "appliedForce");
    assert_eq!(engine.output_samples().len(), 401);
    assert_eq!(engine.max_cost(), 42 * 401);

    // Asymmetric label sets are plain configuration
    assert_eq!(engine.variable("cartVelocity").unwrap().labels().count(), 3);
    assert_eq!(engine.variable("cartPosition").unwrap().labels().count(), 5);
    assert_eq!(engine.variable("angle").unwrap().labels().count(), 7);
}

#[test]
fn test_balanced_state() {
    let engine = pendulum().build().unwrap();
    let outputs = engine.eval(&state(0., 0., 0., 0.)).unwrap();

    // Only the two "zero" rules fire, both at full strength
    let fired: Vec<_> = outputs
        .firing_strengths()
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s > 0.)
        .collect();

    assert_eq!(fired, [(3, &1.), (24, &1.)]);
    assert_close(outputs.value().unwrap(), 0.);
    assert_eq!(outputs.aggregated().degree(0.), 1.);
    assert_eq!(outputs.aggregated().degree(-20.), 0.);
    assert_eq!(outputs.degree("angle", "ZO"), Some(1.));
    assert_eq!(outputs.degree("cartVelocity", "ZERO"), Some(1.));
}

#[test]
fn test_large_angle_pushes_hard() {
    let engine = pendulum().build().unwrap();
    let push = engine.compute(&state(20., 0., 0., 0.)).unwrap();

    // Union of Z and PVB, both at full strength. PVB is five times wider, so
    // the centroid lands at 50 where only PVB holds.
    assert!((push - 50.).abs() < 1e-6, "expected a strong positive force, got {push}");

    let output = engine.output();

    assert!(output.membership("PB").unwrap().degree(push) < 1e-6);
    assert!(output.membership("PVB").unwrap().degree(push) > 0.5);

    let pull = engine.compute(&state(-20., 0., 0., 0.)).unwrap();

    assert_close(pull, -push);
}

#[test]
fn test_saturates_at_universe_edge() {
    let engine = pendulum().build().unwrap();
    let edge = engine.compute(&state(30., 6., 0., 0.)).unwrap();
    let beyond = engine.compute(&state(45., 9., 0., 0.)).unwrap();

    // PVVB plus the cart's Z rule
    assert_eq!(edge, beyond);
    assert!(edge > 45.);
}

#[test]
fn test_single_rule_round_trip() {
    let mut config = pendulum();

    config
        .inputs
        .retain(|v| v.name == "angle" || v.name == "cartVelocity");

    for (label, peak) in [("Z", 0.), ("P", 10.), ("NVB", -60.)] {
        config.rules = vec![RuleConfig {
            premise: ExprConfig::And {
                and: vec![ExprConfig::is("angle", "ZO"), ExprConfig::is("cartVelocity", "ZERO")],
            },
            consequence: label.into(),
        }];

        let engine = config.build().unwrap();
        let value = engine
            .compute(&Inputs::from([("angle", 0.), ("cartVelocity", 0.)]))
            .unwrap();

        assert_close(value, peak);
    }
}

#[test]
fn test_no_rule_fired() {
    let mut config = pendulum();

    config.settings.clip_to_bounds = false;

    let engine = config.build().unwrap();
    let inputs = state(40., 0., 0., 5.);
    let outputs = engine.eval(&inputs).unwrap();

    assert_eq!(outputs.value(), None);
    assert!(!outputs.fired());
    assert!(outputs.aggregated().is_empty());
    assert!(outputs.firing_strengths().iter().all(|&s| s == 0.));
    assert!(matches!(engine.compute(&inputs), Err(Error::NoRuleFired)));
}

#[test]
fn test_rejects_bad_inputs() {
    let engine = pendulum().build().unwrap();
    let mut inputs = state(0., 0., 0., 0.);

    inputs.add("appliedForce", 3.);
    assert_eq!(
        engine.eval(&inputs).unwrap_err(),
        InputError::UnexpectedInput("appliedForce".into())
    );

    let inputs = Inputs::from([("angle", 0.), ("angularVelocity", 0.), ("cartPosition", 0.)]);

    assert!(matches!(
        engine.compute(&inputs),
        Err(Error::Input(InputError::MissingInput(name))) if name == "cartVelocity"
    ));
}

#[test]
fn test_inspection() {
    let engine: MamdaniInference = pendulum().build().unwrap();
    let angle = engine.variable("angle").unwrap();

    // Enough to redraw every curve without the engine
    assert_eq!(angle.universe().samples().len(), 121);
    assert_eq!(angle.membership("PVB").unwrap().degree(24.), 1.);

    let zo = angle.sampled("ZO").unwrap();

    assert_eq!(zo.iter().copied().fold(0., f64::max), 1.);

    let outputs = engine.eval(&state(5., 1., 0.1, -0.05)).unwrap();
    let degrees = outputs.fuzzified("angle").unwrap();

    assert_eq!(degrees.len(), 7);
    assert_eq!(degrees[3].0, "ZO");
    assert_eq!(outputs.aggregated().points().len(), 401);
    assert!(outputs.aggregated().height() <= 1.);
}
