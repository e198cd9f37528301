//! Pole search on a thin strip, a half-wave dipole resonator

use ndarray::Array1;
use num_complex::Complex64;
use openmodes::constants::C;
use openmodes::mesh::rectangular_plate;
use openmodes::operator::{EfieOperator, IntegrationOptions, Operator, PoleOptions};
use openmodes::Simulation;
use std::f64::consts::PI;
use std::sync::Arc;

const LENGTH: f64 = 10e-3;
const WIDTH: f64 = 1.5e-3;

fn strip_simulation() -> (Simulation, openmodes::PartId) {
    let mut sim = Simulation::with_operator(Box::new(EfieOperator::new(IntegrationOptions::default())));
    let mesh = rectangular_plate(LENGTH, WIDTH, 10, 2).unwrap();
    let id = sim.place_part(Arc::new(mesh));
    (sim, id)
}

fn norm(v: &Array1<Complex64>) -> f64 {
    v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

#[test]
fn test_strip_fundamental_pole() {
    let (sim, id) = strip_simulation();
    let half_wave = C / (2.0 * LENGTH);
    let s_start = Complex64::new(0.0, 2.0 * PI * half_wave);

    let estimates = sim.estimate_poles(s_start, &[0], id).unwrap();
    assert_eq!(estimates.len(), 1);
    assert!(estimates.s[0].im > 0.0);

    let poles = sim.refine_poles(&estimates, &PoleOptions::default()).unwrap();
    let s = poles.s[0];
    let f_res = s.im / (2.0 * PI);
    println!("estimate {:.4e}, pole {:.4e}", estimates.s[0] / (2.0 * PI), s / (2.0 * PI));

    // radiating resonance slightly below the half-wave frequency
    assert!(s.re < 0.0, "pole must be damped, got {}", s);
    assert!(f_res > 0.6 * half_wave && f_res < 1.2 * half_wave);
    assert!(-s.re < s.im, "quality factor below 1/2: {}", s);

    // the refined current is a null vector of Z at the pole
    let part = sim.part(id).unwrap();
    let z = sim
        .operator()
        .impedance_single_parts(s, part, part, false)
        .unwrap()
        .value();
    let j = poles.vr.column(0).to_owned();
    let residual = norm(&z.dot(&j));
    let z_scale = z.iter().map(|x| x.norm()).fold(0.0, f64::max);
    assert!(residual < 1e-3 * z_scale * norm(&j), "residual {:e}", residual);
}

#[test]
fn test_strip_modes_ordered_and_conjugated() {
    let (sim, id) = strip_simulation();
    let s_start = Complex64::new(0.0, 2.0 * PI * 10e9);
    let estimates = sim.estimate_poles(s_start, &[0, 1], id).unwrap();
    assert!(estimates.s[0].im <= estimates.s[1].im);

    let both = estimates.add_conjugates();
    assert_eq!(both.len(), 4);
    assert_eq!(both.s[2], estimates.s[0].conj());
    assert_eq!(both.vr.ncols(), 4);
}

#[test]
fn test_unknown_part_rejected() {
    let (sim, id) = strip_simulation();
    let (other, _) = strip_simulation();
    let s_start = Complex64::new(0.0, 2.0 * PI * 10e9);
    let estimates = sim.estimate_poles(s_start, &[0], id).unwrap();
    assert!(other.refine_poles(&estimates, &PoleOptions::default()).is_err());
}
