//! Writers exporting trajectories to tab-separated text.
//!
//! All writers take an arbitrary sink implementing [`std::io::Write`]; they only read the trajectory.
use itertools::izip;
use std::io::Write;

use super::error::HHError;
use super::membrane::{BiophysicalConstants, Stimulus};
use super::trajectory::Trajectory;

/// Write the raw trajectory: one state per line as `V m h n`, tab-separated, without header.
pub fn write_raw<W: Write>(trajectory: &Trajectory, mut writer: W) -> Result<(), HHError> {
    for state in trajectory.states() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            state.v, state.m, state.h, state.n
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the trajectory as a tab-separated table with a header row and an index column.
pub fn write_table<W: Write>(trajectory: &Trajectory, writer: W) -> Result<(), HHError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    wtr.write_record(["", "t", "V", "m", "h", "n"])?;
    for (i, (t, state)) in trajectory.iter().enumerate() {
        wtr.write_record(&[
            i.to_string(),
            t.to_string(),
            state.v.to_string(),
            state.m.to_string(),
            state.h.to_string(),
            state.n.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the injected and ionic currents along the trajectory as a tab-separated table with a header row.
pub fn write_currents<W: Write>(
    trajectory: &Trajectory,
    constants: &BiophysicalConstants,
    stimulus: &Stimulus,
    writer: W,
) -> Result<(), HHError> {
    let currents = trajectory.currents(constants, stimulus);
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    wtr.write_record(["t", "I_inj", "I_Na", "I_K", "I_L"])?;
    for (t, i_inj, i_na, i_k, i_l) in izip!(
        trajectory.times(),
        &currents.stimulus,
        &currents.sodium,
        &currents.potassium,
        &currents.leak
    ) {
        wtr.write_record(&[
            t.to_string(),
            i_inj.to_string(),
            i_na.to_string(),
            i_k.to_string(),
            i_l.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
