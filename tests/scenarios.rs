use bhsim2d::{
    Body, Parameters, Quadrant, Quadtree, Simulation, SimulationConfig, Vector2D, VectorExt,
    direct,
};

/// Two equal masses on a circular orbit about the origin.
fn circular_pair(separation: f64, mass: f64, g: f64) -> Vec<Body> {
    // Each body circles the center of mass at radius d/2: v² = G m / (2 d)
    let speed = (g * mass / (2.0 * separation)).sqrt();
    vec![
        Body::new(Vector2D::new(-separation / 2.0, 0.0), Vector2D::new(0.0, -speed), mass),
        Body::new(Vector2D::new(separation / 2.0, 0.0), Vector2D::new(0.0, speed), mass),
    ]
}

fn random_cluster(n: usize, seed: u64) -> Vec<Body> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..n)
        .map(|_| {
            let pos = Vector2D::new(rng.f64() * 80.0 + 10.0, rng.f64() * 80.0 + 10.0);
            Body::new(pos, Vector2D::zero(), 0.5 + rng.f64())
        })
        .collect()
}

fn energy(sim: &Simulation) -> f64 {
    sim.kinetic_energy() + sim.potential_energy()
}

// ==================================================================================
// Orbits
// ==================================================================================

#[test]
fn two_body_orbit_keeps_its_separation() {
    let params = Parameters::new(1.0, 0.5, 0.001);
    let bounds = Quadrant::new(Vector2D::new(-10.0, -10.0), 20.0);
    let mut sim = Simulation::new(params, bounds, circular_pair(2.0, 1.0, 1.0));
    let e0 = energy(&sim);

    // One period is 4π time units; run about one and a half.
    for _ in 0..20_000 {
        sim.step();
        let [a, b] = sim.bodies() else { unreachable!() };
        let separation = a.pos.distance_to(b.pos);
        assert!(
            (separation - 2.0).abs() < 0.01,
            "separation drifted to {} at step {}",
            separation,
            sim.frame()
        );
    }

    assert!(((energy(&sim) - e0) / e0).abs() < 1e-2);
    assert!(sim.momentum().mag() < 1e-9);
    assert_eq!(sim.escaped(), 0);
}

#[test]
fn heavy_body_gives_analytic_acceleration() {
    let (g, big, r, dt) = (1.0, 1000.0, 10.0, 0.01);
    let params = Parameters::new(g, 0.0, dt);
    let bounds = Quadrant::new(Vector2D::new(-50.0, -50.0), 100.0);
    let bodies = vec![
        Body::new(Vector2D::zero(), Vector2D::zero(), big),
        Body::new(Vector2D::new(r, 0.0), Vector2D::zero(), 1.0),
    ];
    let mut sim = Simulation::new(params, bounds, bodies);
    sim.step();

    let light = sim.bodies()[1];
    let acceleration = light.vel / dt;
    assert!((acceleration.x + g * big / (r * r)).abs() < 1e-9);
    assert!(acceleration.y.abs() < 1e-12);
    assert!((light.pos.x - (r - g * big / (r * r) * dt * dt)).abs() < 1e-12);

    let heavy = sim.bodies()[0];
    assert!((heavy.vel.x / dt - g / (r * r)).abs() < 1e-12);
}

// ==================================================================================
// Tree queries
// ==================================================================================

#[test]
fn empty_region_exerts_no_force() {
    let params = Parameters::default();
    let tree = Quadtree::new(Quadrant::new(Vector2D::zero(), 10.0), &params);
    let probe = Body::new(Vector2D::new(5.0, 5.0), Vector2D::zero(), 1.0);
    assert_eq!(tree.compute_force(0, &probe, params.theta), Vector2D::zero());
}

#[test]
fn smaller_theta_is_more_accurate() {
    let params = Parameters::new(1.0, 0.0, 0.01);
    let bodies = random_cluster(400, 17);
    let tree = Quadtree::build(Quadrant::new(Vector2D::zero(), 100.0), &params, &bodies);

    let error = |theta: f64| -> f64 {
        bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                let exact = direct::force_on(&bodies, i, params.g, params.softening);
                (tree.compute_force(i, body, theta) - exact).mag_sq()
            })
            .sum::<f64>()
    };

    let exact = error(0.0);
    let fine = error(0.2);
    let coarse = error(1.0);
    assert!(exact < 1e-18, "theta = 0 should be exact, error {}", exact);
    assert!(fine < coarse, "theta 0.2: {}, theta 1.0: {}", fine, coarse);
}

// ==================================================================================
// Edge cases
// ==================================================================================

#[test]
fn escaping_body_is_dropped_but_still_integrated() {
    let params = Parameters::new(1.0, 0.5, 0.1);
    let bounds = Quadrant::new(Vector2D::zero(), 10.0);
    let bodies = vec![
        Body::new(Vector2D::new(5.0, 5.0), Vector2D::zero(), 10.0),
        Body::new(Vector2D::new(9.9, 5.0), Vector2D::new(100.0, 0.0), 1.0),
    ];
    let mut sim = Simulation::new(params, bounds, bodies);

    sim.step();
    assert_eq!(sim.escaped(), 0);
    assert!(!sim.bounds().contains(sim.bodies()[1].pos));

    let before = sim.bodies()[1];
    sim.step();
    assert_eq!(sim.escaped(), 1);
    assert_eq!(sim.tree().root().mass(), 10.0);
    assert_eq!(sim.bodies().len(), 2);

    // Still pulled back toward the region.
    let after = sim.bodies()[1];
    assert!(after.vel.x < before.vel.x);
    assert!(after.pos.x > before.pos.x);
}

#[test]
fn coincident_distinct_bodies_stay_finite() {
    let params = Parameters::new(1.0, 0.5, 0.01).with_softening(0.1);
    let bounds = Quadrant::new(Vector2D::zero(), 10.0);
    let pos = Vector2D::new(3.0, 3.0);
    let bodies = vec![
        Body::new(pos, Vector2D::zero(), 1.0),
        Body::new(pos, Vector2D::zero(), 1.0),
        Body::new(Vector2D::new(7.0, 7.0), Vector2D::zero(), 1.0),
    ];
    let mut sim = Simulation::new(params, bounds, bodies);
    sim.run(10);

    for body in sim.bodies() {
        assert!(body.pos.x.is_finite() && body.pos.y.is_finite());
        assert!(body.vel.x.is_finite() && body.vel.y.is_finite());
    }
    // Both fall toward the third body together.
    assert_eq!(sim.bodies()[0].pos, sim.bodies()[1].pos);
    assert!(sim.bodies()[0].pos.x > 3.0);
}

// ==================================================================================
// Scenario files
// ==================================================================================

#[test]
fn bundled_scenarios_run() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    for name in ["default.json", "two_galaxies.yaml"] {
        let config = SimulationConfig::from_path(dir.join(name)).unwrap();
        let expected: usize = config.galaxies.values().map(|g| g.particles).sum();

        let mut sim = config.into_simulation().unwrap();
        assert_eq!(sim.bodies().len(), expected);
        sim.run(2);
        assert_eq!(sim.frame(), 2);
        assert!(sim.bodies().iter().all(|b| b.pos.x.is_finite() && b.pos.y.is_finite()));
    }
}
