//! Text field input views and keyboard accessories.
//!
//! A [`TextField`] can replace its keyboard with a wheel [`DatePicker`] and
//! carry a [`Toolbar`] above it. Toolbar buttons are activated through
//! [`TextField::tap_item`].

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::date::Calendar;

pub const DATE_PICKER_HEIGHT: f64 = 216.0;
pub const DATE_PICKER_TOOLBAR_HEIGHT: f64 = 44.0;
pub const DONE_TOOLBAR_HEIGHT: f64 = 50.0;

type DateCallback = Box<dyn FnMut(DateTime<Utc>) + Send>;
type Callback = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DatePickerMode {
    Time,
    #[default]
    Date,
    DateAndTime,
    CountDownTimer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DatePickerStyle {
    #[default]
    Wheels,
    Compact,
    Inline,
}

/// Presentation options for [`TextField::set_input_view_date_picker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatePickerConfiguration {
    pub mode: DatePickerMode,
    /// Offset east of UTC the picker shows wall-clock time in.
    pub utc_offset_seconds: i32,
    pub cancel_button_title: Option<String>,
    pub done_button_title: Option<String>,
}

impl Default for DatePickerConfiguration {
    fn default() -> Self {
        Self {
            mode: DatePickerMode::Date,
            utc_offset_seconds: 0,
            cancel_button_title: Some("Cancel".to_string()),
            done_button_title: Some("Done".to_string()),
        }
    }
}

/// A date wheel bounded by optional minimum and maximum dates.
pub struct DatePicker {
    pub mode: DatePickerMode,
    pub style: DatePickerStyle,
    pub width: f64,
    pub height: f64,
    calendar: Calendar<FixedOffset>,
    minimum: Option<DateTime<Utc>>,
    maximum: Option<DateTime<Utc>>,
    date: DateTime<Utc>,
    on_change: Option<DateCallback>,
}

impl DatePicker {
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn minimum_date(&self) -> Option<DateTime<Utc>> {
        self.minimum
    }

    pub fn maximum_date(&self) -> Option<DateTime<Utc>> {
        self.maximum
    }

    pub fn calendar(&self) -> &Calendar<FixedOffset> {
        &self.calendar
    }

    /// Set the date without notifying, clamped to the picker's bounds.
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = self.clamp(date);
    }

    /// Select a date as the user would. The change callback sees the
    /// clamped value.
    pub fn select(&mut self, date: DateTime<Utc>) {
        self.set_date(date);
        let selected = self.date;
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(selected);
        }
    }

    fn clamp(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        let date = match self.minimum {
            Some(min) if date < min => min,
            _ => date,
        };
        match self.maximum {
            Some(max) if date > max => max,
            _ => date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarButtonStyle {
    Plain,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    /// Resigns first responder.
    Cancel,
    /// Runs the field's done callback.
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarItem {
    FlexibleSpace,
    Button {
        title: Option<String>,
        style: BarButtonStyle,
        action: ToolbarAction,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toolbar {
    pub items: Vec<ToolbarItem>,
    pub width: f64,
    pub height: f64,
}

/// A single-line text input.
#[derive(Default)]
pub struct TextField {
    pub text: String,
    input_view: Option<DatePicker>,
    input_accessory: Option<Toolbar>,
    first_responder: bool,
    on_done: Option<Callback>,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_first_responder(&self) -> bool {
        self.first_responder
    }

    pub fn become_first_responder(&mut self) {
        self.first_responder = true;
    }

    pub fn resign_first_responder(&mut self) {
        self.first_responder = false;
    }

    /// The date picker shown instead of the keyboard, if any.
    pub fn input_view(&self) -> Option<&DatePicker> {
        self.input_view.as_ref()
    }

    pub fn input_view_mut(&mut self) -> Option<&mut DatePicker> {
        self.input_view.as_mut()
    }

    pub fn input_accessory(&self) -> Option<&Toolbar> {
        self.input_accessory.as_ref()
    }

    pub fn tap_cancel(&mut self) {
        self.resign_first_responder();
    }

    /// Replace the keyboard with a wheel date picker and add a
    /// `[Cancel, flexible space, Done]` toolbar.
    #[allow(clippy::too_many_arguments)]
    pub fn set_input_view_date_picker<C, D>(
        &mut self,
        min_date: Option<DateTime<Utc>>,
        max_date: Option<DateTime<Utc>>,
        current_value: Option<DateTime<Utc>>,
        configuration: &DatePickerConfiguration,
        screen_width: f64,
        on_change: C,
        on_done: D,
    ) where
        C: FnMut(DateTime<Utc>) + Send + 'static,
        D: FnMut() + Send + 'static,
    {
        let offset = FixedOffset::east_opt(configuration.utc_offset_seconds).unwrap_or_else(|| {
            log::warn!(
                "invalid UTC offset {}s, showing UTC",
                configuration.utc_offset_seconds
            );
            Utc.fix()
        });

        let mut picker = DatePicker {
            mode: configuration.mode,
            style: DatePickerStyle::Wheels,
            width: screen_width,
            height: DATE_PICKER_HEIGHT,
            calendar: Calendar::gregorian(offset),
            minimum: min_date,
            maximum: max_date,
            date: Utc::now(),
            on_change: Some(Box::new(on_change)),
        };
        picker.set_date(current_value.unwrap_or(picker.date));

        self.input_view = Some(picker);
        self.input_accessory = Some(Toolbar {
            items: vec![
                ToolbarItem::Button {
                    title: configuration.cancel_button_title.clone(),
                    style: BarButtonStyle::Plain,
                    action: ToolbarAction::Cancel,
                },
                ToolbarItem::FlexibleSpace,
                ToolbarItem::Button {
                    title: configuration.done_button_title.clone(),
                    style: BarButtonStyle::Plain,
                    action: ToolbarAction::Done,
                },
            ],
            width: screen_width,
            height: DATE_PICKER_TOOLBAR_HEIGHT,
        });
        self.on_done = Some(Box::new(on_done));
    }

    /// Add a `[flexible space, Done]` toolbar above the keyboard.
    pub fn add_done_button_on_keyboard<D>(
        &mut self,
        done_button_title: Option<&str>,
        screen_width: f64,
        on_done: D,
    ) where
        D: FnMut() + Send + 'static,
    {
        self.input_accessory = Some(Toolbar {
            items: vec![
                ToolbarItem::FlexibleSpace,
                ToolbarItem::Button {
                    title: done_button_title.map(str::to_string),
                    style: BarButtonStyle::Done,
                    action: ToolbarAction::Done,
                },
            ],
            width: screen_width,
            height: DONE_TOOLBAR_HEIGHT,
        });
        self.on_done = Some(Box::new(on_done));
    }

    /// Activate the toolbar item at `index`. Returns false if there is no
    /// button there.
    pub fn tap_item(&mut self, index: usize) -> bool {
        let action = match self.input_accessory.as_ref().and_then(|t| t.items.get(index)) {
            Some(ToolbarItem::Button { action, .. }) => *action,
            _ => return false,
        };

        match action {
            ToolbarAction::Cancel => self.tap_cancel(),
            ToolbarAction::Done => {
                if let Some(on_done) = self.on_done.as_mut() {
                    on_done();
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 2, d, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_date_picker_toolbar_layout() {
        let mut field = TextField::new();
        field.set_input_view_date_picker(
            None,
            None,
            Some(day(10)),
            &DatePickerConfiguration::default(),
            390.0,
            |_| {},
            || {},
        );

        let picker = field.input_view().unwrap();
        assert_eq!(picker.style, DatePickerStyle::Wheels);
        assert_eq!((picker.width, picker.height), (390.0, DATE_PICKER_HEIGHT));
        assert_eq!(picker.date(), day(10));

        let toolbar = field.input_accessory().unwrap();
        assert_eq!(toolbar.height, DATE_PICKER_TOOLBAR_HEIGHT);
        assert!(matches!(
            &toolbar.items[0],
            ToolbarItem::Button { title: Some(t), action: ToolbarAction::Cancel, .. } if t == "Cancel"
        ));
        assert_eq!(toolbar.items[1], ToolbarItem::FlexibleSpace);
        assert!(matches!(
            &toolbar.items[2],
            ToolbarItem::Button { action: ToolbarAction::Done, .. }
        ));
    }

    #[test]
    fn test_selection_is_clamped_and_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let mut field = TextField::new();
        field.set_input_view_date_picker(
            Some(day(5)),
            Some(day(20)),
            Some(day(1)),
            &DatePickerConfiguration::default(),
            320.0,
            move |date| seen_clone.lock().unwrap().push(date),
            || {},
        );

        let picker = field.input_view_mut().unwrap();
        // Initial value is clamped silently
        assert_eq!(picker.date(), day(5));
        assert!(seen.lock().unwrap().is_empty());

        picker.select(day(25));
        picker.select(day(12));
        assert_eq!(*seen.lock().unwrap(), vec![day(20), day(12)]);
    }

    #[test]
    fn test_cancel_resigns_and_done_calls_back() {
        let done = Arc::new(Mutex::new(0));
        let done_clone = Arc::clone(&done);

        let mut field = TextField::new();
        field.set_input_view_date_picker(
            None,
            None,
            None,
            &DatePickerConfiguration::default(),
            320.0,
            |_| {},
            move || *done_clone.lock().unwrap() += 1,
        );
        field.become_first_responder();

        assert!(field.tap_item(2));
        assert_eq!(*done.lock().unwrap(), 1);
        assert!(field.is_first_responder());

        assert!(!field.tap_item(1));
        assert!(field.tap_item(0));
        assert!(!field.is_first_responder());
    }

    #[test]
    fn test_picker_uses_configured_offset() {
        let config = DatePickerConfiguration {
            mode: DatePickerMode::DateAndTime,
            utc_offset_seconds: 3 * 3600,
            ..Default::default()
        };
        let mut field = TextField::new();
        field.set_input_view_date_picker(None, None, Some(day(1)), &config, 320.0, |_| {}, || {});

        let picker = field.input_view().unwrap();
        assert_eq!(picker.mode, DatePickerMode::DateAndTime);
        assert_eq!(picker.calendar().hour(&picker.date()), 12);
    }

    #[test]
    fn test_done_button_on_keyboard() {
        let done = Arc::new(Mutex::new(false));
        let done_clone = Arc::clone(&done);

        let mut field = TextField::new();
        field.add_done_button_on_keyboard(Some("OK"), 375.0, move || *done_clone.lock().unwrap() = true);

        let toolbar = field.input_accessory().unwrap();
        assert_eq!(toolbar.height, DONE_TOOLBAR_HEIGHT);
        assert_eq!(toolbar.items.len(), 2);
        assert_eq!(
            toolbar.items[1],
            ToolbarItem::Button {
                title: Some("OK".to_string()),
                style: BarButtonStyle::Done,
                action: ToolbarAction::Done,
            }
        );
        assert!(field.input_view().is_none());

        assert!(field.tap_item(1));
        assert!(*done.lock().unwrap());
    }

    #[test]
    fn test_configuration_from_json() {
        let config: DatePickerConfiguration =
            serde_json::from_str(r#"{"mode":"Time","done_button_title":null}"#).unwrap();
        assert_eq!(config.mode, DatePickerMode::Time);
        assert_eq!(config.cancel_button_title.as_deref(), Some("Cancel"));
        assert_eq!(config.done_button_title, None);
    }
}
