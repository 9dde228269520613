use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use cascade_select::{CascadeSelect, OptionNode, SelectConfig, SelectEvent};
use cascade_ui_picker::{OptionRowContext, PickerView, ViewCell};
use env_logger::Env;
use iced::widget::{Column, button, container, text};
use iced::{Color, Element, Length, Subscription, Task};

const TICK_MS: u64 = 16;

const JOBS: &str = r#"[
    {
        "id": 1,
        "label": "Office",
        "children": [
            {
                "id": 11,
                "label": "Administration",
                "children": [
                    { "id": 111, "label": "Clerk" },
                    { "id": 112, "label": "Receptionist" }
                ]
            },
            {
                "id": 12,
                "label": "Finance",
                "children": [
                    { "id": 121, "label": "Accountant" },
                    { "id": 122, "label": "Auditor" }
                ]
            }
        ]
    },
    {
        "id": 2,
        "label": "Transport",
        "children": [
            {
                "id": 21,
                "label": "Road",
                "children": [
                    { "id": 211, "label": "Truck driver" },
                    { "id": 212, "label": "Bus driver" }
                ]
            },
            {
                "id": 22,
                "label": "Rail",
                "children": [
                    { "id": 221, "label": "Train driver" }
                ]
            }
        ]
    }
]"#;

const CONFIG: &str = r#"{
    "title": "Choose an occupation",
    "selection_key": "id",
    "preselect": 121,
    "level_labels": ["Sector", "Group", "Occupation"]
}"#;

#[derive(Debug, Clone)]
enum Message {
    Picker(SelectEvent),
    Hover(Option<usize>),
    Tick(Instant),
}

struct JobPicker {
    select: Option<CascadeSelect<ViewCell>>,
    chosen: Rc<RefCell<Option<String>>>,
    hovered: Option<usize>,
    error: Option<String>,
}

impl JobPicker {
    fn new() -> (Self, Task<Message>) {
        let chosen: Rc<RefCell<Option<String>>> = Rc::default();
        let mut state = Self {
            select: None,
            chosen: Rc::clone(&chosen),
            hovered: None,
            error: None,
        };

        match build_select(chosen) {
            Ok(select) => state.select = Some(select),
            Err(err) => {
                log::error!("failed to build job picker: {err}");
                state.error = Some(err.to_string());
            },
        }

        (state, Task::none())
    }

    fn update(&mut self, message: Message) {
        let Some(select) = self.select.as_mut() else {
            return;
        };

        match message {
            Message::Picker(event) => {
                self.hovered = None;
                select.update(event);
            },
            Message::Hover(row) => self.hovered = row,
            Message::Tick(now) => select.update(SelectEvent::Tick { now }),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(error) = self.error.as_deref() {
            return container(text(error)).padding(12).into();
        }

        let popup = self
            .select
            .as_ref()
            .and_then(|select| select.target().snapshot());
        if let Some(popup) = popup {
            return PickerView::new(popup)
                .on_event(Message::Picker)
                .on_hover(Message::Hover)
                .hovered(self.hovered)
                .row_style(row_style)
                .spacing(2.0)
                .view();
        }

        let summary = self
            .chosen
            .borrow()
            .clone()
            .unwrap_or_else(|| String::from("Nothing chosen yet"));

        container(
            Column::new()
                .spacing(8)
                .push(text(summary))
                .push(
                    button(text("Choose occupation"))
                        .on_press(Message::Picker(SelectEvent::Open)),
                ),
        )
        .padding(12)
        .width(Length::Fill)
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let is_pending = self
            .select
            .as_ref()
            .is_some_and(|select| select.next_deadline().is_some());
        if !is_pending {
            return Subscription::none();
        }

        iced::time::every(Duration::from_millis(TICK_MS)).map(Message::Tick)
    }
}

fn build_select(
    chosen: Rc<RefCell<Option<String>>>,
) -> anyhow::Result<CascadeSelect<ViewCell>> {
    let roots: Vec<OptionNode> = serde_json::from_str(JOBS)?;
    let config = SelectConfig::from_json_str(CONFIG)?;

    let select = CascadeSelect::new(
        roots,
        config,
        move |path: &[OptionNode]| {
            let labels: Vec<&str> = path.iter().map(OptionNode::label).collect();
            log::info!("occupation chosen: {}", labels.join(" > "));
            *chosen.borrow_mut() = Some(labels.join(" > "));
        },
        ViewCell::new(),
    )?;

    Ok(select)
}

fn row_style(context: &OptionRowContext<'_>) -> container::Style {
    let background = if context.row.highlighted {
        Some(Color::from_rgb(0.12, 0.26, 0.46).into())
    } else if context.is_hovered {
        Some(Color::from_rgb(0.18, 0.18, 0.18).into())
    } else {
        None
    };

    container::Style {
        background,
        text_color: Some(Color::from_rgb(0.9, 0.9, 0.9)),
        ..Default::default()
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .format_timestamp_millis()
        .init();

    iced::application(JobPicker::new, JobPicker::update, JobPicker::view)
        .subscription(JobPicker::subscription)
        .run()
}
