//! Example: cutting a synthetic 3-D dataset down to plottable slices
//!
//! What it demonstrates
//! - Building a `Wave` with physical coordinate axes.
//! - Configuring point/region executors and a free line in the registry.
//! - Subscribing to update notifications the way a display layer would.
//! - Computing 1-D and 2-D cuts with `make_wave`.
//!
//! How to run
//! ```bash
//! RUST_LOG=debug cargo run --example multicut
//! ```

use ndarray::{Array1, ArrayD, IxDyn};
use wavecut::{AxisRef, ExecutorRegistry, UpdateFilter, Wave};

fn main() {
    env_logger::init();

    // A 32x32x16 "spectral map": a Gaussian blob drifting with the third
    // axis, on millimeter x/y axes and an energy axis in eV.
    let (nx, ny, ne) = (32usize, 32usize, 16usize);
    let mut data = ArrayD::zeros(IxDyn(&[nx, ny, ne]));
    for i in 0..nx {
        for j in 0..ny {
            for e in 0..ne {
                let cx = 12.0 + e as f64 * 0.5;
                let d2 = (i as f64 - cx).powi(2) + (j as f64 - 16.0).powi(2);
                data[IxDyn(&[i, j, e])] = (-d2 / 40.0).exp();
            }
        }
    }
    let wave = Wave::new(
        data,
        vec![
            Some(Array1::linspace(0.0, 3.1, nx)),
            Some(Array1::linspace(0.0, 3.1, ny)),
            Some(Array1::linspace(1.2, 4.2, ne)),
        ],
    )
    .expect("axis vectors match the data shape");

    let mut registry = ExecutorRegistry::new();
    let updates = registry.updates().subscribe(UpdateFilter::all());

    // Integrate a 0.6 eV window on the energy axis, then view the x/y map.
    registry.add_region(vec![2], vec![[2.0, 2.6]]);
    let map = registry
        .make_wave(&wave, &[AxisRef::Axis(0), AxisRef::Axis(1)])
        .expect("valid two-axis cut");
    println!("energy-integrated map: {:?}", map.data.shape());

    // Drop a crosshair and pull the spectrum under it.
    registry.add_point(vec![0, 1], vec![1.3, 1.6]);
    let spectrum = registry
        .make_wave(&wave, &[AxisRef::Axis(2)])
        .expect("valid single-axis cut");
    println!(
        "spectrum under the crosshair: {} samples, {:.2}..{:.2} eV",
        spectrum.data.len(),
        spectrum.axes[0].as_ref().unwrap()[0],
        spectrum.axes[0].as_ref().unwrap()[spectrum.data.len() - 1]
    );

    // Cut along an oblique line in the x/y plane; the result's axis is arc
    // length in millimeters.
    let line = registry.add_free_line([0, 1], [[0.4, 0.4], [2.8, 2.2]]);
    let profile = registry
        .make_wave(&wave, &[AxisRef::Line(line), AxisRef::Axis(2)])
        .expect("valid line cut");
    println!("line profile vs energy: {:?}", profile.data.shape());

    // Everything the display layer would have been told along the way.
    let mut events = 0;
    while let Ok(evt) = updates.try_recv() {
        println!("update: {} on {:?}", evt.kinds, evt.axes);
        events += 1;
    }
    println!("{events} registry notifications observed");
}
