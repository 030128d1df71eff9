//! The single ordered description of the config file layout.
//!
//! [`FILE_ORDER`] lists every field in the exact order it appears on disk;
//! the loader and the rewriter both walk it, so the file layout is defined in
//! one place. [`Section`] groups the same fields for the editor menus.

use crate::model::{
    AcqMode, ChannelValue, EnumToken, IoLevel, LinkType, ParamId, ParamSet, PulsePolarity, PurMode,
    TriggerConfig,
};
use crate::parser::{self, ValueError};

/// Identity of one field in the file. `Channel` fields occupy one line per
/// channel; every other field is a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    LinkNum,
    LinkType,
    BaseAddress,
    IoLevel,
    AcqMode,
    RecordLength,
    ChannelMask,
    EventAggr,
    PulsePolarity,
    Channel(ParamId),
    Purh,
    Purgap,
    Blthr,
    Bltmo,
    Trgho,
    AcqTime,
}

/// On-disk order of every field. The mask precedes every channel block, so
/// the loader always knows the block width before reading one.
pub const FILE_ORDER: &[FieldId] = &[
    FieldId::LinkNum,
    FieldId::LinkType,
    FieldId::BaseAddress,
    FieldId::IoLevel,
    FieldId::AcqMode,
    FieldId::RecordLength,
    FieldId::ChannelMask,
    FieldId::EventAggr,
    FieldId::PulsePolarity,
    FieldId::Channel(ParamId::Thr),
    FieldId::Channel(ParamId::Nsbl),
    FieldId::Channel(ParamId::Lgate),
    FieldId::Channel(ParamId::Sgate),
    FieldId::Channel(ParamId::Pgate),
    FieldId::Channel(ParamId::Selft),
    FieldId::Channel(ParamId::Trgc),
    FieldId::Channel(ParamId::Tvaw),
    FieldId::Channel(ParamId::Csens),
    FieldId::Purh,
    FieldId::Purgap,
    FieldId::Blthr,
    FieldId::Bltmo,
    FieldId::Trgho,
    FieldId::AcqTime,
];

/// Editor menu sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Communication,
    Acquisition,
    Dpp,
    Timing,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Communication,
        Section::Acquisition,
        Section::Dpp,
        Section::Timing,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Communication => "Communication parameters",
            Section::Acquisition => "Acquisition parameters",
            Section::Dpp => "DPP parameters",
            Section::Timing => "Timing parameters",
        }
    }

    pub fn fields(self) -> &'static [FieldId] {
        match self {
            Section::Communication => &FILE_ORDER[0..4],
            Section::Acquisition => &FILE_ORDER[4..9],
            Section::Dpp => &FILE_ORDER[9..23],
            Section::Timing => &FILE_ORDER[23..24],
        }
    }
}

/// Name shown in menus and reports.
pub fn display_name(id: FieldId) -> &'static str {
    match id {
        FieldId::LinkNum => "LinkNum",
        FieldId::LinkType => "LinkType",
        FieldId::BaseAddress => "VMEBaseAddress",
        FieldId::IoLevel => "IOLevel",
        FieldId::AcqMode => "AcqMode",
        FieldId::RecordLength => "RecordLength",
        FieldId::ChannelMask => "ChannelMask",
        FieldId::EventAggr => "EventAggr",
        FieldId::PulsePolarity => "PulsePolarity",
        FieldId::Channel(p) => p.name(),
        FieldId::Purh => "purh",
        FieldId::Purgap => "purgap",
        FieldId::Blthr => "blthr",
        FieldId::Bltmo => "bltmo",
        FieldId::Trgho => "trgho",
        FieldId::AcqTime => "AcqTime (ms)",
    }
}

/// Parses one line as the given scalar field and stores it. `dirty` selects
/// operator-edit semantics (flag raised) versus file-load semantics.
pub fn apply_scalar(
    model: &mut ParamSet,
    id: FieldId,
    line: &str,
    dirty: bool,
) -> Result<(), ValueError> {
    match id {
        FieldId::LinkNum => model.link_num.store(parser::parse_u32(line)?, dirty),
        FieldId::LinkType => model
            .link_type
            .store(parser::parse_token::<LinkType>(line)?, dirty),
        FieldId::BaseAddress => model.base_address.store(parser::parse_u32(line)?, dirty),
        FieldId::IoLevel => model
            .io_level
            .store(parser::parse_token::<IoLevel>(line)?, dirty),
        FieldId::AcqMode => model
            .acq_mode
            .store(parser::parse_token::<AcqMode>(line)?, dirty),
        FieldId::RecordLength => model.record_length.store(parser::parse_u32(line)?, dirty),
        FieldId::ChannelMask => model
            .channel_mask
            .store(parser::parse_hex_mask(line)?, dirty),
        FieldId::EventAggr => model.event_aggr.store(parser::parse_u32(line)?, dirty),
        FieldId::PulsePolarity => model
            .pulse_polarity
            .store(parser::parse_token::<PulsePolarity>(line)?, dirty),
        FieldId::Channel(_) => return Err(ValueError::MalformedTriple),
        FieldId::Purh => model
            .purh
            .store(parser::parse_token::<PurMode>(line)?, dirty),
        FieldId::Purgap => model.purgap.store(parser::parse_i32(line)?, dirty),
        FieldId::Blthr => model.blthr.store(parser::parse_i32(line)?, dirty),
        FieldId::Bltmo => model.bltmo.store(parser::parse_i32(line)?, dirty),
        FieldId::Trgho => model.trgho.store(parser::parse_u32(line)?, dirty),
        FieldId::AcqTime => model.acq_time_ms.store(parser::parse_u64(line)?, dirty),
    }
    Ok(())
}

/// Canonical serialized form of a scalar field, as the rewriter emits it.
/// The mask normalizes to lowercase `0x…`.
pub fn scalar_text(model: &ParamSet, id: FieldId) -> String {
    match id {
        FieldId::LinkNum => model.link_num.value().to_string(),
        FieldId::LinkType => model.link_type.value().token().to_string(),
        FieldId::BaseAddress => model.base_address.value().to_string(),
        FieldId::IoLevel => model.io_level.value().token().to_string(),
        FieldId::AcqMode => model.acq_mode.value().token().to_string(),
        FieldId::RecordLength => model.record_length.value().to_string(),
        FieldId::ChannelMask => format!("{:#x}", model.channel_mask.value()),
        FieldId::EventAggr => model.event_aggr.value().to_string(),
        FieldId::PulsePolarity => model.pulse_polarity.value().token().to_string(),
        FieldId::Channel(p) => p.name().to_string(),
        FieldId::Purh => model.purh.value().token().to_string(),
        FieldId::Purgap => model.purgap.value().to_string(),
        FieldId::Blthr => model.blthr.value().to_string(),
        FieldId::Bltmo => model.bltmo.value().to_string(),
        FieldId::Trgho => model.trgho.value().to_string(),
        FieldId::AcqTime => model.acq_time_ms.value().to_string(),
    }
}

/// Parses the value cell of a channel triple for the given parameter.
pub fn parse_channel_value(param: ParamId, text: &str) -> Result<ChannelValue, ValueError> {
    match param {
        ParamId::Trgc => Ok(ChannelValue::Trigger(parser::parse_token::<TriggerConfig>(
            text,
        )?)),
        _ => Ok(ChannelValue::Int(parser::parse_i32(text)?)),
    }
}

/// One serialized channel line: `<ch>,<enable bit>,<value>`.
pub fn channel_line(model: &ParamSet, param: ParamId, ch: usize) -> String {
    let bit = (model.channel_mask.value() >> ch) & 1;
    format!("{},{},{}", ch, bit, model.channel_cell(param, ch))
}

pub fn field_dirty(model: &ParamSet, id: FieldId) -> bool {
    match id {
        FieldId::LinkNum => model.link_num.is_dirty(),
        FieldId::LinkType => model.link_type.is_dirty(),
        FieldId::BaseAddress => model.base_address.is_dirty(),
        FieldId::IoLevel => model.io_level.is_dirty(),
        FieldId::AcqMode => model.acq_mode.is_dirty(),
        FieldId::RecordLength => model.record_length.is_dirty(),
        FieldId::ChannelMask => model.channel_mask.is_dirty(),
        FieldId::EventAggr => model.event_aggr.is_dirty(),
        FieldId::PulsePolarity => model.pulse_polarity.is_dirty(),
        FieldId::Channel(p) => model.channel_dirty(p),
        FieldId::Purh => model.purh.is_dirty(),
        FieldId::Purgap => model.purgap.is_dirty(),
        FieldId::Blthr => model.blthr.is_dirty(),
        FieldId::Bltmo => model.bltmo.is_dirty(),
        FieldId::Trgho => model.trgho.is_dirty(),
        FieldId::AcqTime => model.acq_time_ms.is_dirty(),
    }
}

/// A section is modified when any of its fields is.
pub fn section_modified(model: &ParamSet, section: Section) -> bool {
    section.fields().iter().any(|&f| field_dirty(model, f))
}

pub fn any_modified(model: &ParamSet) -> bool {
    Section::ALL.iter().any(|&s| section_modified(model, s))
}

/// Every modified field, in file order.
pub fn modified_fields(model: &ParamSet) -> Vec<FieldId> {
    FILE_ORDER
        .iter()
        .copied()
        .filter(|&f| field_dirty(model, f))
        .collect()
}
