//! Typed parameter model with per-field modification tracking.
//!
//! Every scalar lives in a [`Field`] and every per-channel array in a
//! [`ChannelField`]; both remember whether the operator changed them since the
//! file was loaded. Loading populates values without raising dirty flags, so
//! after a fresh load nothing is considered modified.

use crate::parser::ValueError;

/// Number of channels implied by a mask: 1 + index of the highest set bit.
/// Disabled channels below the highest bit still count.
///
/// Panics on a zero mask; the parsers reject that value before it can reach
/// the model.
pub fn channel_width(mask: u32) -> usize {
    assert!(mask != 0, "zero channel mask");
    32 - mask.leading_zeros() as usize
}

/// Closed token set read from and written to the config file.
pub trait EnumToken: Sized + Copy {
    /// Human-readable list of accepted tokens, for error messages.
    const EXPECTED: &'static str;
    fn from_token(text: &str) -> Option<Self>;
    fn token(self) -> &'static str;
}

macro_rules! enum_tokens {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl EnumToken for $name {
            const EXPECTED: &'static str = concat!($($token, " "),+);

            fn from_token(text: &str) -> Option<Self> {
                match text {
                    $($token => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn token(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }
    };
}

enum_tokens! {
    /// Physical link to the digitizer.
    LinkType {
        Usb => "CAEN_DGTZ_USB",
        OpticalLink => "CAEN_DGTZ_OpticalLink",
    }
}

enum_tokens! {
    /// Front-panel I/O signal standard.
    IoLevel {
        Ttl => "CAEN_DGTZ_IOLevel_TTL",
        Nim => "CAEN_DGTZ_IOLevel_NIM",
    }
}

enum_tokens! {
    /// DPP acquisition mode.
    AcqMode {
        Oscilloscope => "CAEN_DGTZ_DPP_ACQ_MODE_Oscilloscope",
        List => "CAEN_DGTZ_DPP_ACQ_MODE_List",
        Mixed => "CAEN_DGTZ_DPP_ACQ_MODE_Mixed",
    }
}

enum_tokens! {
    /// Input pulse polarity.
    PulsePolarity {
        Positive => "CAEN_DGTZ_PulsePolarityPositive",
        Negative => "CAEN_DGTZ_PulsePolarityNegative",
    }
}

enum_tokens! {
    /// Pile-up rejection mode.
    PurMode {
        DetectOnly => "CAEN_DGTZ_DPP_PSD_PUR_DetectOnly",
        Enabled => "CAEN_DGTZ_DPP_PSD_PUR_Enabled",
    }
}

enum_tokens! {
    /// Per-channel self-trigger configuration.
    TriggerConfig {
        Threshold => "CAEN_DGTZ_DPP_TriggerConfig_Threshold",
        Peak => "CAEN_DGTZ_DPP_TriggerConfig_Peak",
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        TriggerConfig::Threshold
    }
}

/// One scalar parameter plus its modification flag.
#[derive(Debug, Clone)]
pub struct Field<T> {
    value: T,
    dirty: bool,
}

impl<T> Field<T> {
    pub fn new(value: T) -> Self {
        Field { value, dirty: false }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn value(&self) -> T
    where
        T: Copy,
    {
        self.value
    }

    /// Operator edit: replaces the value and marks the field modified.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
    }

    /// File load: replaces the value without touching the flag.
    pub fn load(&mut self, value: T) {
        self.value = value;
    }

    pub fn store(&mut self, value: T, dirty: bool) {
        if dirty {
            self.set(value);
        } else {
            self.load(value);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// One per-channel parameter array plus its modification flag. The array is
/// only ever replaced wholesale, never element by element.
#[derive(Debug, Clone)]
pub struct ChannelField<T> {
    values: Vec<T>,
    dirty: bool,
}

impl<T> ChannelField<T> {
    pub fn new(values: Vec<T>) -> Self {
        ChannelField {
            values,
            dirty: false,
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn store(&mut self, values: Vec<T>, dirty: bool) {
        self.values = values;
        if dirty {
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// The nine per-channel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamId {
    Thr,
    Selft,
    Csens,
    Sgate,
    Lgate,
    Pgate,
    Tvaw,
    Nsbl,
    Trgc,
}

impl ParamId {
    /// Canonical reporting order (the order inconsistencies are listed in).
    pub const ALL: [ParamId; 9] = [
        ParamId::Thr,
        ParamId::Selft,
        ParamId::Csens,
        ParamId::Sgate,
        ParamId::Lgate,
        ParamId::Pgate,
        ParamId::Tvaw,
        ParamId::Nsbl,
        ParamId::Trgc,
    ];

    pub fn index(self) -> usize {
        match self {
            ParamId::Thr => 0,
            ParamId::Selft => 1,
            ParamId::Csens => 2,
            ParamId::Sgate => 3,
            ParamId::Lgate => 4,
            ParamId::Pgate => 5,
            ParamId::Tvaw => 6,
            ParamId::Nsbl => 7,
            ParamId::Trgc => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamId::Thr => "thr",
            ParamId::Selft => "selft",
            ParamId::Csens => "csens",
            ParamId::Sgate => "sgate",
            ParamId::Lgate => "lgate",
            ParamId::Pgate => "pgate",
            ParamId::Tvaw => "tvaw",
            ParamId::Nsbl => "nsbl",
            ParamId::Trgc => "trgc",
        }
    }
}

/// A value destined for one slot of a channel array. Eight of the nine
/// per-channel parameters are integers; `trgc` carries a trigger-config token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelValue {
    Int(i32),
    Trigger(TriggerConfig),
}

/// The full digitizer configuration, in file order.
#[derive(Debug, Clone)]
pub struct ParamSet {
    // communication
    pub link_num: Field<u32>,
    pub link_type: Field<LinkType>,
    pub base_address: Field<u32>,
    pub io_level: Field<IoLevel>,
    // acquisition
    pub acq_mode: Field<AcqMode>,
    pub record_length: Field<u32>,
    pub channel_mask: Field<u32>,
    pub event_aggr: Field<u32>,
    pub pulse_polarity: Field<PulsePolarity>,
    // per-channel DPP parameters
    pub thr: ChannelField<i32>,
    pub selft: ChannelField<i32>,
    pub csens: ChannelField<i32>,
    pub sgate: ChannelField<i32>,
    pub lgate: ChannelField<i32>,
    pub pgate: ChannelField<i32>,
    pub tvaw: ChannelField<i32>,
    pub nsbl: ChannelField<i32>,
    pub trgc: ChannelField<TriggerConfig>,
    // board-wide DPP parameters
    pub purh: Field<PurMode>,
    pub purgap: Field<i32>,
    pub blthr: Field<i32>,
    pub bltmo: Field<i32>,
    pub trgho: Field<u32>,
    // timing
    pub acq_time_ms: Field<u64>,
    /// Channel-block width of the file on disk. Differs from
    /// `channel_width(mask)` between a mask edit and the next successful save.
    file_channel_width: usize,
}

impl Default for ParamSet {
    fn default() -> Self {
        ParamSet {
            link_num: Field::new(1),
            link_type: Field::new(LinkType::Usb),
            base_address: Field::new(0),
            io_level: Field::new(IoLevel::Ttl),
            acq_mode: Field::new(AcqMode::List),
            record_length: Field::new(0),
            channel_mask: Field::new(0xF),
            event_aggr: Field::new(1000),
            pulse_polarity: Field::new(PulsePolarity::Negative),
            thr: ChannelField::new(vec![30, 100, 30, 35]),
            selft: ChannelField::new(vec![1; 4]),
            csens: ChannelField::new(vec![2; 4]),
            sgate: ChannelField::new(vec![18; 4]),
            lgate: ChannelField::new(vec![32; 4]),
            pgate: ChannelField::new(vec![3; 4]),
            tvaw: ChannelField::new(vec![50; 4]),
            nsbl: ChannelField::new(vec![2; 4]),
            trgc: ChannelField::new(vec![TriggerConfig::Threshold; 4]),
            purh: Field::new(PurMode::DetectOnly),
            purgap: Field::new(100),
            blthr: Field::new(3),
            bltmo: Field::new(100),
            trgho: Field::new(256),
            acq_time_ms: Field::new(15000),
            file_channel_width: 4,
        }
    }
}

impl ParamSet {
    /// Channel count implied by the current mask.
    pub fn width(&self) -> usize {
        channel_width(self.channel_mask.value())
    }

    pub fn file_channel_width(&self) -> usize {
        self.file_channel_width
    }

    pub fn set_file_channel_width(&mut self, width: usize) {
        self.file_channel_width = width;
    }

    fn channel(&self, param: ParamId) -> &ChannelField<i32> {
        match param {
            ParamId::Thr => &self.thr,
            ParamId::Selft => &self.selft,
            ParamId::Csens => &self.csens,
            ParamId::Sgate => &self.sgate,
            ParamId::Lgate => &self.lgate,
            ParamId::Pgate => &self.pgate,
            ParamId::Tvaw => &self.tvaw,
            ParamId::Nsbl => &self.nsbl,
            // trgc is the odd one out; callers that need it go through
            // channel_dirty/channel_cell instead
            ParamId::Trgc => unreachable!("trgc is not an integer parameter"),
        }
    }

    /// Populated length of one channel array.
    pub fn channel_len(&self, param: ParamId) -> usize {
        match param {
            ParamId::Trgc => self.trgc.len(),
            _ => self.channel(param).len(),
        }
    }

    pub fn channel_dirty(&self, param: ParamId) -> bool {
        match param {
            ParamId::Trgc => self.trgc.is_dirty(),
            _ => self.channel(param).is_dirty(),
        }
    }

    /// Replaces one channel array wholesale. Every element must match the
    /// parameter's value kind; a mismatch can only come from driving the model
    /// with values parsed for a different parameter.
    pub fn commit_channel(
        &mut self,
        param: ParamId,
        values: Vec<ChannelValue>,
        dirty: bool,
    ) -> Result<(), ValueError> {
        if param == ParamId::Trgc {
            let mut out = Vec::with_capacity(values.len());
            for v in values {
                match v {
                    ChannelValue::Trigger(t) => out.push(t),
                    ChannelValue::Int(_) => return Err(ValueError::MalformedTriple),
                }
            }
            self.trgc.store(out, dirty);
            return Ok(());
        }
        let mut out = Vec::with_capacity(values.len());
        for v in values {
            match v {
                ChannelValue::Int(i) => out.push(i),
                ChannelValue::Trigger(_) => return Err(ValueError::MalformedTriple),
            }
        }
        match param {
            ParamId::Thr => self.thr.store(out, dirty),
            ParamId::Selft => self.selft.store(out, dirty),
            ParamId::Csens => self.csens.store(out, dirty),
            ParamId::Sgate => self.sgate.store(out, dirty),
            ParamId::Lgate => self.lgate.store(out, dirty),
            ParamId::Pgate => self.pgate.store(out, dirty),
            ParamId::Tvaw => self.tvaw.store(out, dirty),
            ParamId::Nsbl => self.nsbl.store(out, dirty),
            ParamId::Trgc => {}
        }
        Ok(())
    }

    /// Text of one channel array slot, as written in a triple's value cell.
    /// Slots past the populated range fall back to the type default; the
    /// editor's consistency gate keeps that path out of normal saves.
    pub fn channel_cell(&self, param: ParamId, ch: usize) -> String {
        match param {
            ParamId::Trgc => self
                .trgc
                .values()
                .get(ch)
                .copied()
                .unwrap_or_default()
                .token()
                .to_string(),
            _ => self
                .channel(param)
                .values()
                .get(ch)
                .copied()
                .unwrap_or_default()
                .to_string(),
        }
    }
}
