//! Machine-readable configuration summary.
//!
//! One comma-separated line per section (channel arrays one line each), with
//! `#` section headers, meant for quick ingestion by analysis scripts.

use std::io::{self, Write};

use crate::model::{EnumToken, ParamId, ParamSet};

const CHANNEL_ORDER: [ParamId; 9] = [
    ParamId::Thr,
    ParamId::Nsbl,
    ParamId::Lgate,
    ParamId::Sgate,
    ParamId::Pgate,
    ParamId::Selft,
    ParamId::Trgc,
    ParamId::Tvaw,
    ParamId::Csens,
];

/// Writes the full parameter summary to any sink.
pub fn write_summary<W: Write>(model: &ParamSet, out: &mut W) -> io::Result<()> {
    writeln!(out, "# Communication parameters")?;
    writeln!(
        out,
        "{},{},{},{}",
        model.link_num.value(),
        model.link_type.value().token(),
        model.base_address.value(),
        model.io_level.value().token()
    )?;
    writeln!(out, "# Acquisition parameters")?;
    writeln!(
        out,
        "{},{},{:#x},{},{}",
        model.acq_mode.value().token(),
        model.record_length.value(),
        model.channel_mask.value(),
        model.event_aggr.value(),
        model.pulse_polarity.value().token()
    )?;
    writeln!(out, "# DPP parameters (one line per parameter, one cell per channel)")?;
    for param in CHANNEL_ORDER {
        let cells: Vec<String> = (0..model.channel_len(param))
            .map(|ch| model.channel_cell(param, ch))
            .collect();
        writeln!(out, "{},{}", param.name(), cells.join(","))?;
    }
    writeln!(out, "# Board DPP parameters")?;
    writeln!(
        out,
        "{},{},{},{},{}",
        model.purh.value().token(),
        model.purgap.value(),
        model.blthr.value(),
        model.bltmo.value(),
        model.trgho.value()
    )?;
    writeln!(out, "# Acquisition time (ms)")?;
    writeln!(out, "{}", model.acq_time_ms.value())?;
    Ok(())
}
