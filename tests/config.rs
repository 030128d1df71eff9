//! Unit-level tests: field parsers, width rule, in-memory load, consistency
//! tracker and menu gating.

use std::io::Cursor;

use dppconf::model::{ChannelValue, ParamId, TriggerConfig};
use dppconf::{channel_width, editor, load, parser, ChannelTracker, ConfigError, ValueError};

/// Builds a complete comment-free config text for the given mask. One value
/// line per field, `width` lines per channel block, so line numbers are
/// predictable in error tests.
fn sample_config(mask_text: &str, mask: u32) -> String {
    let width = channel_width(mask);
    let mut out = String::new();
    let mut scalar = |v: &str| {
        out.push_str(v);
        out.push('\n');
    };
    scalar("1");
    scalar("CAEN_DGTZ_USB");
    scalar("32100352");
    scalar("CAEN_DGTZ_IOLevel_NIM");
    scalar("CAEN_DGTZ_DPP_ACQ_MODE_Mixed");
    scalar("4096");
    scalar(mask_text);
    scalar("1023");
    scalar("CAEN_DGTZ_PulsePolarityPositive");
    // channel blocks in file order
    let cells = [
        ("thr", "50"),
        ("nsbl", "2"),
        ("lgate", "32"),
        ("sgate", "18"),
        ("pgate", "3"),
        ("selft", "1"),
        ("trgc", "CAEN_DGTZ_DPP_TriggerConfig_Threshold"),
        ("tvaw", "50"),
        ("csens", "2"),
    ];
    for (_, cell) in cells {
        for ch in 0..width {
            out.push_str(&format!("{},{},{}\n", ch, (mask >> ch) & 1, cell));
        }
    }
    out.push_str("CAEN_DGTZ_DPP_PSD_PUR_DetectOnly\n");
    out.push_str("100\n3\n100\n256\n15000\n");
    out
}

fn load_text(text: &str) -> Result<(dppconf::ParamSet, ChannelTracker), ConfigError> {
    load::load_from_reader(Cursor::new(text), "test")
}

// ==================== Field parsers ====================

#[test]
fn parse_u32_accepts_zero_literally() {
    assert_eq!(parser::parse_u32("0").expect("zero"), 0);
    assert_eq!(parser::parse_u32("4096").expect("plain"), 4096);
}

#[test]
fn parse_u32_rejects_non_numeric_and_overflow() {
    assert!(matches!(
        parser::parse_u32("abc"),
        Err(ValueError::NotANumber)
    ));
    assert!(matches!(parser::parse_u32(""), Err(ValueError::NotANumber)));
    assert!(matches!(
        parser::parse_u32("-5"),
        Err(ValueError::NotANumber)
    ));
    // one past u32::MAX
    assert!(matches!(
        parser::parse_u32("4294967296"),
        Err(ValueError::OutOfRange)
    ));
}

#[test]
fn parse_i32_accepts_negatives() {
    assert_eq!(parser::parse_i32("-100").expect("negative"), -100);
    assert!(matches!(
        parser::parse_i32("2147483648"),
        Err(ValueError::OutOfRange)
    ));
}

#[test]
fn parse_hex_mask_prefix_is_optional() {
    assert_eq!(parser::parse_hex_mask("0xF").expect("prefixed"), 0xF);
    assert_eq!(parser::parse_hex_mask("0XF").expect("uppercase prefix"), 0xF);
    assert_eq!(parser::parse_hex_mask("F").expect("bare"), 0xF);
    assert_eq!(parser::parse_hex_mask("ff").expect("lowercase"), 0xFF);
}

#[test]
fn parse_hex_mask_rejects_zero_and_junk() {
    assert!(matches!(
        parser::parse_hex_mask("0x0"),
        Err(ValueError::ZeroMask)
    ));
    assert!(matches!(
        parser::parse_hex_mask("0"),
        Err(ValueError::ZeroMask)
    ));
    assert!(matches!(
        parser::parse_hex_mask("xyz"),
        Err(ValueError::NotANumber)
    ));
    // 9 hex digits, past 32 bits
    assert!(matches!(
        parser::parse_hex_mask("0x100000000"),
        Err(ValueError::OutOfRange)
    ));
}

#[test]
fn parse_token_is_case_sensitive() {
    let t: TriggerConfig =
        parser::parse_token("CAEN_DGTZ_DPP_TriggerConfig_Peak").expect("peak");
    assert_eq!(t, TriggerConfig::Peak);
    let err = parser::parse_token::<TriggerConfig>("caen_dgtz_dpp_triggerconfig_peak");
    assert!(matches!(err, Err(ValueError::UnknownToken { .. })));
}

#[test]
fn parse_triple_shapes() {
    let t = parser::parse_triple("2,1,30").expect("triple");
    assert_eq!(t.channel, "2");
    assert_eq!(t.enable, 1);
    assert_eq!(t.value, "30");

    assert!(matches!(
        parser::parse_triple("2,1"),
        Err(ValueError::MalformedTriple)
    ));
    assert!(matches!(
        parser::parse_triple("2,7,30"),
        Err(ValueError::MalformedTriple)
    ));
    assert!(matches!(
        parser::parse_triple("a,1,30"),
        Err(ValueError::MalformedTriple)
    ));
}

// ==================== Channel width rule ====================

#[test]
fn width_is_one_plus_highest_set_bit() {
    // 0x5 enables channels 0 and 2, width is still 3
    assert_eq!(channel_width(0x5), 3);
    assert_eq!(channel_width(0x1), 1);
    assert_eq!(channel_width(0xF), 4);
}

// ==================== Load ====================

#[test]
fn load_populates_without_dirty_flags() {
    let text = sample_config("0x5", 0x5);
    let (model, tracker) = load_text(&text).expect("load");
    assert_eq!(model.link_num.value(), 1);
    assert_eq!(model.record_length.value(), 4096);
    assert_eq!(model.channel_mask.value(), 0x5);
    assert_eq!(model.width(), 3);
    assert_eq!(model.file_channel_width(), 3);
    assert_eq!(model.thr.values(), &[50, 50, 50]);
    assert_eq!(model.acq_time_ms.value(), 15000);
    assert!(!dppconf::schema::any_modified(&model));
    assert!(tracker.all_consistent());
}

#[test]
fn load_rejects_zero_mask_with_line_number() {
    let text = sample_config("0x0", 0x5);
    match load_text(&text) {
        Err(ConfigError::Parse { line, source, .. }) => {
            // mask is the 7th value line, no comments in the sample
            assert_eq!(line, 7);
            assert!(matches!(source, ValueError::ZeroMask));
        }
        other => panic!("expected zero-mask parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn load_counts_comment_lines_in_error_positions() {
    let mut text = String::from("# leading comment\n\n");
    text.push_str(&sample_config("0x5", 0x5));
    let broken = text.replace("4096", "not_a_number");
    match load_text(&broken) {
        Err(ConfigError::Parse { line, .. }) => assert_eq!(line, 8),
        other => panic!("expected parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn truncated_channel_block_fails_at_the_missing_line() {
    // width 4 but only 3 thr lines: the next value line is nsbl's channel 0,
    // which fails the index check for channel 3
    let text = sample_config("0xF", 0xF);
    let broken = text.replacen("3,1,50\n", "", 1);
    match load_text(&broken) {
        Err(ConfigError::Parse { line, source, .. }) => {
            assert_eq!(line, 13);
            assert!(matches!(
                source,
                ValueError::ChannelIndex { expected: 3, .. }
            ));
        }
        other => panic!("expected index mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn enable_bit_must_match_the_mask() {
    // mask 0x5 disables channel 1, so its enable bit must be 0
    let text = sample_config("0x5", 0x5).replacen("1,0,50\n", "1,1,50\n", 1);
    match load_text(&text) {
        Err(ConfigError::Parse { source, .. }) => {
            assert!(matches!(source, ValueError::EnableBit { channel: 1 }));
        }
        other => panic!("expected enable-bit mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn truncated_file_reports_eof() {
    let text = sample_config("0x5", 0x5);
    let cut = &text[..text.len() - "15000\n".len()]; // drop the acq-time line
    assert!(matches!(
        load_text(cut),
        Err(ConfigError::UnexpectedEof { .. })
    ));
}

#[test]
fn default_file_parses_back_to_the_default_model() {
    let mut buf = Vec::new();
    dppconf::defaults::render(&mut buf, &dppconf::ParamSet::default()).expect("render");
    let text = String::from_utf8(buf).expect("utf8");
    let (model, tracker) = load_text(&text).expect("load rendered defaults");
    let fresh = dppconf::ParamSet::default();
    assert_eq!(model.channel_mask.value(), fresh.channel_mask.value());
    assert_eq!(model.thr.values(), fresh.thr.values());
    assert_eq!(model.trgc.values(), fresh.trgc.values());
    assert_eq!(model.acq_time_ms.value(), fresh.acq_time_ms.value());
    assert!(tracker.all_consistent());
}

// ==================== Consistency tracker ====================

#[test]
fn growing_the_mask_invalidates_until_reentry() {
    // mask 0x3 loaded, operator grows it to 0xF
    let text = sample_config("0x3", 0x3);
    let (mut model, mut tracker) = load_text(&text).expect("load");
    model.channel_mask.set(0xF);
    tracker.set_channel_width(model.width());
    assert!(!tracker.all_consistent());
    assert!(tracker.needs_update(ParamId::Thr));

    // re-enter thr at the new width
    let values = vec![ChannelValue::Int(10); 4];
    model
        .commit_channel(ParamId::Thr, values, true)
        .expect("commit");
    tracker.mark_updated(ParamId::Thr);
    assert!(!tracker.needs_update(ParamId::Thr));
    assert_eq!(tracker.inconsistent().len(), 8);
}

#[test]
fn inconsistent_listing_uses_canonical_order() {
    let mut tracker = ChannelTracker::new(2);
    tracker.set_channel_width(4);
    assert_eq!(
        tracker.inconsistent_names(),
        "thr, selft, csens, sgate, lgate, pgate, tvaw, nsbl, trgc"
    );
}

// ==================== Menu gating ====================

#[test]
fn save_and_start_disappear_while_inconsistent() {
    let gated = editor::main_actions(true, false);
    assert!(!gated.contains(&editor::MainAction::Save));
    assert!(!gated.contains(&editor::MainAction::Start));
    assert!(gated.contains(&editor::MainAction::Modify));
    assert!(gated.contains(&editor::MainAction::Quit));

    let open = editor::main_actions(true, true);
    assert!(open.contains(&editor::MainAction::Save));
    assert!(open.contains(&editor::MainAction::Start));

    // a clean model does not reopen Start while the tracker disagrees with
    // the mask width
    let clean_gated = editor::main_actions(false, false);
    assert!(!clean_gated.contains(&editor::MainAction::Start));
    assert!(!clean_gated.contains(&editor::MainAction::Save));
    assert_eq!(
        clean_gated,
        &[editor::MainAction::Modify, editor::MainAction::Quit][..]
    );
}

#[test]
fn modified_listing_only_offered_after_a_modification() {
    let fresh = editor::main_actions(false, true);
    assert!(!fresh.contains(&editor::MainAction::ShowModified));
    assert!(fresh.contains(&editor::MainAction::Start));
}

// ==================== Scripted editor sessions ====================

#[test]
fn editing_the_mask_updates_the_tracker_width() {
    let text = sample_config("0x3", 0x3);
    let (mut model, mut tracker) = load_text(&text).expect("load");
    // modify -> acquisition block -> ChannelMask (3rd field) -> 0xF -> back out -> quit
    let script = "m\n2\n3\n0xF\nb\nb\nq\n";
    let mut out = Vec::new();
    let mut ed = editor::Editor::new(Cursor::new(script), &mut out);
    let outcome = ed
        .run(&mut model, &mut tracker, std::path::Path::new("unused.ini"))
        .expect("session");
    assert_eq!(outcome, dppconf::Outcome::Quit);
    assert_eq!(model.channel_mask.value(), 0xF);
    assert!(model.channel_mask.is_dirty());
    assert_eq!(tracker.width(), 4);
    assert!(!tracker.all_consistent());
}

#[test]
fn channel_edit_is_all_or_nothing() {
    let text = sample_config("0x3", 0x3);
    let (mut model, mut tracker) = load_text(&text).expect("load");
    // modify -> DPP block -> thr (1st field) -> good value, then a bad one
    let script = "m\n3\n1\n40\nnot_a_number\nb\nb\nq\n";
    let mut out = Vec::new();
    let mut ed = editor::Editor::new(Cursor::new(script), &mut out);
    ed.run(&mut model, &mut tracker, std::path::Path::new("unused.ini"))
        .expect("session");
    // the half-entered edit left the stored array untouched and clean
    assert_eq!(model.thr.values(), &[50, 50]);
    assert!(!model.thr.is_dirty());
}

#[test]
fn complete_channel_edit_commits_and_marks_updated() {
    let text = sample_config("0x3", 0x3);
    let (mut model, mut tracker) = load_text(&text).expect("load");
    let script = "m\n3\n1\n40\n41\nb\nb\nq\n";
    let mut out = Vec::new();
    let mut ed = editor::Editor::new(Cursor::new(script), &mut out);
    ed.run(&mut model, &mut tracker, std::path::Path::new("unused.ini"))
        .expect("session");
    assert_eq!(model.thr.values(), &[40, 41]);
    assert!(model.thr.is_dirty());
    assert!(tracker.all_consistent());
}

#[test]
fn start_returns_proceed() {
    let text = sample_config("0x5", 0x5);
    let (mut model, mut tracker) = load_text(&text).expect("load");
    let mut out = Vec::new();
    let mut ed = editor::Editor::new(Cursor::new("s\n"), &mut out);
    let outcome = ed
        .run(&mut model, &mut tracker, std::path::Path::new("unused.ini"))
        .expect("session");
    assert_eq!(outcome, dppconf::Outcome::Proceed);
}

#[test]
fn menu_keys_are_case_insensitive() {
    let text = sample_config("0x5", 0x5);
    let (mut model, mut tracker) = load_text(&text).expect("load");
    let mut out = Vec::new();
    let mut ed = editor::Editor::new(Cursor::new("Q\n"), &mut out);
    let outcome = ed
        .run(&mut model, &mut tracker, std::path::Path::new("unused.ini"))
        .expect("session");
    assert_eq!(outcome, dppconf::Outcome::Quit);
}

// ==================== Report ====================

#[test]
fn summary_lists_channel_arrays_one_line_each() {
    let text = sample_config("0x5", 0x5);
    let (model, _) = load_text(&text).expect("load");
    let mut buf = Vec::new();
    dppconf::report::write_summary(&model, &mut buf).expect("summary");
    let rendered = String::from_utf8(buf).expect("utf8");
    assert!(rendered.contains("# Communication parameters"));
    assert!(rendered.contains("thr,50,50,50"));
    assert!(rendered.contains("CAEN_DGTZ_DPP_ACQ_MODE_Mixed,4096,0x5,1023,"));
    assert!(rendered.ends_with("15000\n"));
}
