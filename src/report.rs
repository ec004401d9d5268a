use std::fmt::Write;

use suspx::{SimulationKind, SimulationReport};

/// Render a textual summary of a simulation report.
///
/// Each series is summarised by its value at the first, middle and last
/// solved travel, which is enough to read the trend of a curve.
#[must_use]
pub fn render_summary(report: &SimulationReport) -> String {
    let mut output = String::new();

    // Name the run so the reader knows whether one or two corners follow.
    let title = match report.simulation {
        SimulationKind::WheelAttitude => "Wheel attitude sweep",
        SimulationKind::Jacking => "Jacking sweep",
    };
    writeln!(&mut output, "{title}").expect("writing to string cannot fail");

    // One block per corner: how much of the sweep solved, then each curve
    // at its start, middle and end.
    for corner in &report.corners {
        writeln!(
            &mut output,
            "{}: {} steps, {} gaps",
            corner.corner,
            corner.steps.len(),
            corner.gaps.len()
        )
        .expect("writing to string cannot fail");

        for series in &corner.series {
            let unit = series.characteristic.unit();
            let picks = [
                series.samples.first(),
                series.samples.get(series.samples.len() / 2),
                series.samples.last(),
            ];
            let rendered: Vec<String> = picks
                .iter()
                .flatten()
                .map(|(travel, value)| format!("{value:+.3} {unit} @ {travel:+.1} mm"))
                .collect();
            writeln!(
                &mut output,
                "  {}: {}",
                series.characteristic,
                rendered.join(", ")
            )
            .expect("writing to string cannot fail");
        }
    }

    // Only the endpoints of the roll centre path are shown.
    if let (Some(first), Some(last)) = (report.jacking.first(), report.jacking.last()) {
        writeln!(
            &mut output,
            "Roll centre: ({:+.1}, {:+.1}) mm @ {:+.1} mm to ({:+.1}, {:+.1}) mm @ {:+.1} mm",
            first.roll_center.y,
            first.roll_center.z,
            first.travel,
            last.roll_center.y,
            last.roll_center.z,
            last.travel
        )
        .expect("writing to string cannot fail");
    }

    // Say why a requested curve is missing instead of dropping it silently.
    for omission in &report.omitted {
        writeln!(
            &mut output,
            "Omitted {} on {}: {}",
            omission.characteristic, omission.corner, omission.reason
        )
        .expect("writing to string cannot fail");
    }

    output
}
