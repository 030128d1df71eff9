//! Built-in default configuration file.
//!
//! Renders the default [`ParamSet`] through the same schema walk the rewriter
//! uses, with a comment header per field, so the generated file always parses
//! back. Four channels enabled (mask `0xF`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::model::{ParamId, ParamSet};
use crate::schema::{self, FieldId, Section};

/// Writes the default config file. Refuses to replace an existing file
/// unless `overwrite` is set.
pub fn write_default_file(path: &Path, overwrite: bool) -> io::Result<()> {
    if !overwrite && path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }
    let model = ParamSet::default();
    let mut out = BufWriter::new(File::create(path)?);
    render(&mut out, &model)?;
    out.flush()
}

/// Renders a complete config file for any model state.
pub fn render<W: Write>(out: &mut W, model: &ParamSet) -> io::Result<()> {
    writeln!(out, "# DPP-PSD digitizer configuration")?;
    writeln!(out, "# One value per line; lines starting with # are ignored.")?;
    for section in Section::ALL {
        writeln!(out)?;
        writeln!(out, "# ===== {} =====", section.title())?;
        for &id in section.fields() {
            match id {
                FieldId::Channel(param) => {
                    writeln!(out, "# {} (<ch>,<enable>,<value>, one line per channel)", comment_for(id))?;
                    for ch in 0..model.width() {
                        writeln!(out, "{}", schema::channel_line(model, param, ch))?;
                    }
                }
                _ => {
                    writeln!(out, "# {}", comment_for(id))?;
                    writeln!(out, "{}", schema::scalar_text(model, id))?;
                }
            }
        }
    }
    Ok(())
}

fn comment_for(id: FieldId) -> &'static str {
    match id {
        FieldId::LinkNum => "LinkNum: index of the link the board sits on",
        FieldId::LinkType => "LinkType: CAEN_DGTZ_USB or CAEN_DGTZ_OpticalLink",
        FieldId::BaseAddress => "VMEBaseAddress (decimal; 0 for direct USB)",
        FieldId::IoLevel => "IOLevel: CAEN_DGTZ_IOLevel_TTL or CAEN_DGTZ_IOLevel_NIM",
        FieldId::AcqMode => "AcqMode: Oscilloscope, List or Mixed",
        FieldId::RecordLength => "RecordLength: samples per waveform",
        FieldId::ChannelMask => "ChannelMask: enabled channels, hex",
        FieldId::EventAggr => "EventAggr: events per aggregate (0 = automatic)",
        FieldId::PulsePolarity => "PulsePolarity of the input signal",
        FieldId::Channel(p) => channel_comment(p),
        FieldId::Purh => "purh: pile-up rejection mode",
        FieldId::Purgap => "purgap: purity gap (LSB)",
        FieldId::Blthr => "blthr: baseline threshold",
        FieldId::Bltmo => "bltmo: baseline timeout",
        FieldId::Trgho => "trgho: trigger holdoff (samples)",
        FieldId::AcqTime => "Acquisition time in milliseconds",
    }
}

fn channel_comment(param: ParamId) -> &'static str {
    match param {
        ParamId::Thr => "thr: trigger threshold (LSB)",
        ParamId::Selft => "selft: self trigger, 0 = disabled, 1 = enabled",
        ParamId::Csens => "csens: charge sensitivity",
        ParamId::Sgate => "sgate: short gate width (samples)",
        ParamId::Lgate => "lgate: long gate width (samples)",
        ParamId::Pgate => "pgate: gate offset (samples)",
        ParamId::Tvaw => "tvaw: trigger validation acceptance window",
        ParamId::Nsbl => "nsbl: number of samples for the baseline mean",
        ParamId::Trgc => "trgc: trigger configuration token",
    }
}
