//! Interactive parameter editor.
//!
//! A three-state menu machine: main menu, section picker, field picker. The
//! machine is driven by a synchronous line-read loop over generic
//! `BufRead`/`Write` streams, so tests script it with in-memory buffers. The
//! gating rule lives in [`main_actions`], a pure function: while any channel
//! array is inconsistent with the mask width, saving and starting are off the
//! menu.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::consistency::ChannelTracker;
use crate::model::{ParamId, ParamSet};
use crate::rewrite;
use crate::schema::{self, FieldId, Section};

/// How an editing session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Leave without starting; unsaved edits are discarded with the process.
    Quit,
    /// Hand the configuration to the acquisition phase.
    Proceed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainAction {
    Modify,
    ShowModified,
    Save,
    Start,
    Quit,
}

impl MainAction {
    fn key(self) -> char {
        match self {
            MainAction::Modify => 'm',
            MainAction::ShowModified => 'p',
            MainAction::Save => 'f',
            MainAction::Start => 's',
            MainAction::Quit => 'q',
        }
    }

    fn label(self) -> &'static str {
        match self {
            MainAction::Modify => "modify a parameter",
            MainAction::ShowModified => "print the modified parameters",
            MainAction::Save => "save the configuration to file",
            MainAction::Start => "start the acquisition",
            MainAction::Quit => "quit",
        }
    }
}

/// Actions available on the main menu. Save and Start disappear while any
/// channel array is inconsistent; the modified-parameter listing only appears
/// once something was modified.
pub fn main_actions(modified: bool, consistent: bool) -> &'static [MainAction] {
    match (modified, consistent) {
        (false, true) => &[MainAction::Modify, MainAction::Start, MainAction::Quit],
        (false, false) => &[MainAction::Modify, MainAction::Quit],
        (true, true) => &[
            MainAction::Modify,
            MainAction::ShowModified,
            MainAction::Save,
            MainAction::Start,
            MainAction::Quit,
        ],
        (true, false) => &[
            MainAction::Modify,
            MainAction::ShowModified,
            MainAction::Quit,
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorState {
    Main,
    SectionPicker,
    FieldPicker(Section),
}

/// The interactive session. `input` is typically stdin and `out` stdout;
/// tests substitute cursors.
pub struct Editor<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Editor { input, out }
    }

    /// Runs the menu loop until the operator quits or starts. End of input is
    /// treated as quitting.
    pub fn run(
        &mut self,
        model: &mut ParamSet,
        tracker: &mut ChannelTracker,
        path: &Path,
    ) -> io::Result<Outcome> {
        let mut state = EditorState::Main;
        loop {
            match state {
                EditorState::Main => {
                    self.show_all(model)?;
                    self.warn_inconsistent(tracker)?;
                    let actions = main_actions(schema::any_modified(model), tracker.all_consistent());
                    for a in actions {
                        writeln!(self.out, "  {}) {}", a.key(), a.label())?;
                    }
                    write!(self.out, "> ")?;
                    self.out.flush()?;
                    let Some(line) = self.read_line()? else {
                        return Ok(Outcome::Quit);
                    };
                    let key = line.to_ascii_lowercase();
                    match actions.iter().copied().find(|a| key == a.key().to_string()) {
                        Some(MainAction::Modify) => state = EditorState::SectionPicker,
                        Some(MainAction::ShowModified) => self.show_modified(model)?,
                        Some(MainAction::Save) => match rewrite::rewrite(path, model) {
                            Ok(()) => writeln!(self.out, "Configuration saved to {}.", path.display())?,
                            Err(e) => writeln!(self.out, "Save failed: {e}. File left untouched.")?,
                        },
                        Some(MainAction::Start) => return Ok(Outcome::Proceed),
                        Some(MainAction::Quit) => return Ok(Outcome::Quit),
                        None => writeln!(self.out, "Unknown choice `{line}`.")?,
                    }
                }
                EditorState::SectionPicker => {
                    for (i, s) in Section::ALL.iter().enumerate() {
                        writeln!(self.out, "  {}) {}", i + 1, s.title())?;
                    }
                    writeln!(self.out, "  b) back")?;
                    write!(self.out, "> ")?;
                    self.out.flush()?;
                    let Some(line) = self.read_line()? else {
                        return Ok(Outcome::Quit);
                    };
                    if line.eq_ignore_ascii_case("b") {
                        state = EditorState::Main;
                    } else {
                        match line.parse::<usize>() {
                            Ok(n) if (1..=Section::ALL.len()).contains(&n) => {
                                state = EditorState::FieldPicker(Section::ALL[n - 1]);
                            }
                            _ => writeln!(self.out, "Pick a block number between 1 and 4.")?,
                        }
                    }
                }
                EditorState::FieldPicker(section) => {
                    self.show_section(model, section, true)?;
                    self.warn_inconsistent(tracker)?;
                    writeln!(self.out, "  b) back")?;
                    write!(self.out, "> ")?;
                    self.out.flush()?;
                    let Some(line) = self.read_line()? else {
                        return Ok(Outcome::Quit);
                    };
                    if line.eq_ignore_ascii_case("b") {
                        state = EditorState::SectionPicker;
                    } else {
                        let fields = section.fields();
                        match line.parse::<usize>() {
                            Ok(n) if (1..=fields.len()).contains(&n) => {
                                self.edit_field(model, tracker, fields[n - 1])?;
                            }
                            _ => writeln!(
                                self.out,
                                "Pick a parameter number between 1 and {}.",
                                fields.len()
                            )?,
                        }
                    }
                }
            }
        }
    }

    /// Next non-blank input line, cleaned. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.input.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            let cleaned = crate::scanner::clean(&buf);
            if !cleaned.is_empty() {
                return Ok(Some(cleaned.to_string()));
            }
        }
    }

    fn warn_inconsistent(&mut self, tracker: &ChannelTracker) -> io::Result<()> {
        if !tracker.all_consistent() {
            writeln!(
                self.out,
                "WARNING: parameters not matching the channel mask width: {}",
                tracker.inconsistent_names()
            )?;
            writeln!(
                self.out,
                "Re-enter them before saving or starting the acquisition."
            )?;
        }
        Ok(())
    }

    fn show_all(&mut self, model: &ParamSet) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Current configuration:")?;
        for s in Section::ALL {
            self.show_section(model, s, false)?;
        }
        Ok(())
    }

    fn show_section(&mut self, model: &ParamSet, section: Section, numbered: bool) -> io::Result<()> {
        writeln!(self.out, "--- {} ---", section.title())?;
        for (i, &id) in section.fields().iter().enumerate() {
            let marker = if schema::field_dirty(model, id) { "*" } else { "" };
            let value = field_text(model, id);
            if numbered {
                writeln!(
                    self.out,
                    "  {}) {}{}: {}",
                    i + 1,
                    schema::display_name(id),
                    marker,
                    value
                )?;
            } else {
                writeln!(self.out, "  {}{}: {}", schema::display_name(id), marker, value)?;
            }
        }
        Ok(())
    }

    fn show_modified(&mut self, model: &ParamSet) -> io::Result<()> {
        let modified = schema::modified_fields(model);
        if modified.is_empty() {
            writeln!(self.out, "No parameter modified.")?;
        } else {
            let names: Vec<&str> = modified.iter().map(|&f| schema::display_name(f)).collect();
            writeln!(self.out, "Modified parameters: {}", names.join(", "))?;
        }
        Ok(())
    }

    fn edit_field(
        &mut self,
        model: &mut ParamSet,
        tracker: &mut ChannelTracker,
        id: FieldId,
    ) -> io::Result<()> {
        match id {
            FieldId::Channel(param) => self.edit_channel(model, tracker, param),
            FieldId::ChannelMask => {
                write!(self.out, "New value for ChannelMask (hex): ")?;
                self.out.flush()?;
                let Some(line) = self.read_line()? else {
                    return Ok(());
                };
                match schema::apply_scalar(model, id, &line, true) {
                    Ok(()) => {
                        tracker.set_channel_width(model.width());
                        writeln!(self.out, "'ChannelMask' value modified.")?;
                    }
                    Err(e) => writeln!(self.out, "Invalid value: {e}. Parameter unchanged.")?,
                }
                Ok(())
            }
            _ => {
                write!(self.out, "New value for {}: ", schema::display_name(id))?;
                self.out.flush()?;
                let Some(line) = self.read_line()? else {
                    return Ok(());
                };
                match schema::apply_scalar(model, id, &line, true) {
                    Ok(()) => writeln!(
                        self.out,
                        "'{}' value modified.",
                        schema::display_name(id)
                    )?,
                    Err(e) => writeln!(self.out, "Invalid value: {e}. Parameter unchanged.")?,
                }
                Ok(())
            }
        }
    }

    /// All-or-nothing re-entry of one channel array: one value prompt per
    /// channel at the current mask width; the first invalid value aborts the
    /// whole edit and leaves the stored array untouched. The operator types
    /// only the value; channel index and enable bit are fixed by position and
    /// mask.
    fn edit_channel(
        &mut self,
        model: &mut ParamSet,
        tracker: &mut ChannelTracker,
        param: ParamId,
    ) -> io::Result<()> {
        let width = model.width();
        let mask = model.channel_mask.value();
        writeln!(
            self.out,
            "Enter {} values for '{}' (<ch>,<enable>, then the value):",
            width,
            param.name()
        )?;
        let mut values = Vec::with_capacity(width);
        for ch in 0..width {
            write!(self.out, "{},{},", ch, (mask >> ch) & 1)?;
            self.out.flush()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.out, "Input ended; parameter unchanged.")?;
                return Ok(());
            };
            match schema::parse_channel_value(param, &line) {
                Ok(v) => values.push(v),
                Err(e) => {
                    writeln!(self.out, "Invalid value: {e}. Parameter unchanged.")?;
                    return Ok(());
                }
            }
        }
        // values parsed for this parameter, kinds always agree
        if model.commit_channel(param, values, true).is_ok() {
            tracker.mark_updated(param);
            writeln!(self.out, "'{}' values modified.", param.name())?;
        }
        Ok(())
    }
}

/// Display text of any field, channel arrays shown as comma-joined values.
fn field_text(model: &ParamSet, id: FieldId) -> String {
    match id {
        FieldId::Channel(p) => (0..model.channel_len(p))
            .map(|ch| model.channel_cell(p, ch))
            .collect::<Vec<_>>()
            .join(", "),
        _ => schema::scalar_text(model, id),
    }
}
