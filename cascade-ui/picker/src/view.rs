use std::rc::Rc;

use iced::widget::{
    Column, Row, Space, button, container, mouse_area, scrollable, text,
    text_input,
};
use iced::{Element, Length, Theme, mouse};

use cascade_select::{OptionRow, PopupView, SelectEvent, ViewMode};

const SECTION_SPACING: f32 = 8.0;
const TAB_SPACING: f32 = 4.0;
const TITLE_SIZE: f32 = 18.0;
const CONTEXT_SIZE: f32 = 12.0;

/// Rendering context passed to row callbacks.
pub struct OptionRowContext<'a> {
    pub index: usize,
    pub row: &'a OptionRow,
    /// The row is the chosen node of its level or the pick waiting to
    /// advance.
    pub is_highlighted: bool,
    pub is_hovered: bool,
}

type RowRenderer<'a, Message> =
    dyn Fn(&OptionRowContext<'a>) -> Element<'a, Message> + 'a;
type RowStyle<'a> = dyn Fn(&OptionRowContext<'a>) -> container::Style + 'a;
type IndexAction<'a, Message> = dyn Fn(usize) -> Message + 'a;
type HoverAction<'a, Message> = dyn Fn(Option<usize>) -> Message + 'a;
type InputAction<'a, Message> = dyn Fn(String) -> Message + 'a;
type TabStyle = fn(&Theme, button::Status) -> button::Style;

/// Draws one [`PopupView`] snapshot: title bar, search box, level tabs and
/// the option list.
pub struct PickerView<'a, Message: Clone + 'a> {
    popup: &'a PopupView,
    hovered: Option<usize>,
    on_option: Option<Box<IndexAction<'a, Message>>>,
    on_category: Option<Box<IndexAction<'a, Message>>>,
    on_hover: Option<Box<HoverAction<'a, Message>>>,
    on_search: Option<Box<InputAction<'a, Message>>>,
    on_clear_search: Option<Message>,
    on_close: Option<Message>,
    render_row: Box<RowRenderer<'a, Message>>,
    row_style: Option<Box<RowStyle<'a>>>,
    spacing: f32,
}

impl<'a, Message> PickerView<'a, Message>
where
    Message: Clone + 'a,
{
    /// Create a picker for `popup` with the default row renderer.
    pub fn new(popup: &'a PopupView) -> Self {
        Self {
            popup,
            hovered: None,
            on_option: None,
            on_category: None,
            on_hover: None,
            on_search: None,
            on_clear_search: None,
            on_close: None,
            render_row: Box::new(default_row),
            row_style: None,
            spacing: 0.0,
        }
    }

    /// Provide the hovered row index to inform row rendering.
    pub fn hovered(mut self, row: Option<usize>) -> Self {
        self.hovered = row;
        self
    }

    /// Route every interaction through one [`SelectEvent`] mapper.
    pub fn on_event(
        self,
        on_event: impl Fn(SelectEvent) -> Message + 'a,
    ) -> Self {
        let on_event: Rc<dyn Fn(SelectEvent) -> Message + 'a> =
            Rc::new(on_event);
        let option = Rc::clone(&on_event);
        let category = Rc::clone(&on_event);
        let search = Rc::clone(&on_event);
        let clear = on_event(SelectEvent::SearchCleared);
        let close = on_event(SelectEvent::Close);

        self.on_option(move |row| option(SelectEvent::OptionPressed { row }))
            .on_category(move |level| {
                category(SelectEvent::CategoryPressed { level })
            })
            .on_search(move |term| search(SelectEvent::SearchChanged { term }))
            .on_clear_search(clear)
            .on_close(close)
    }

    /// Emit a message when an option row is pressed.
    pub fn on_option(
        mut self,
        on_option: impl Fn(usize) -> Message + 'a,
    ) -> Self {
        self.on_option = Some(Box::new(on_option));
        self
    }

    /// Emit a message when a level tab is pressed.
    pub fn on_category(
        mut self,
        on_category: impl Fn(usize) -> Message + 'a,
    ) -> Self {
        self.on_category = Some(Box::new(on_category));
        self
    }

    /// Emit a message when the pointer enters or leaves a row.
    pub fn on_hover(
        mut self,
        on_hover: impl Fn(Option<usize>) -> Message + 'a,
    ) -> Self {
        self.on_hover = Some(Box::new(on_hover));
        self
    }

    /// Emit a message when the search box changes.
    pub fn on_search(
        mut self,
        on_search: impl Fn(String) -> Message + 'a,
    ) -> Self {
        self.on_search = Some(Box::new(on_search));
        self
    }

    /// Message sent by the clear button next to a non-blank search term.
    pub fn on_clear_search(mut self, message: Message) -> Self {
        self.on_clear_search = Some(message);
        self
    }

    /// Message sent by the close button.
    pub fn on_close(mut self, message: Message) -> Self {
        self.on_close = Some(message);
        self
    }

    /// Replace the default row content.
    pub fn render_row(
        mut self,
        render_row: impl Fn(&OptionRowContext<'a>) -> Element<'a, Message> + 'a,
    ) -> Self {
        self.render_row = Box::new(render_row);
        self
    }

    /// Provide a row style callback for background/text styling.
    pub fn row_style(
        mut self,
        row_style: impl Fn(&OptionRowContext<'a>) -> container::Style + 'a,
    ) -> Self {
        self.row_style = Some(Box::new(row_style));
        self
    }

    /// Vertical spacing between rows.
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    /// Build the `Element` for the popup.
    pub fn view(self) -> Element<'a, Message> {
        let Self {
            popup,
            hovered,
            on_option,
            on_category,
            on_hover,
            on_search,
            on_clear_search,
            on_close,
            render_row,
            row_style,
            spacing,
        } = self;

        let mut header = Column::new()
            .spacing(SECTION_SPACING)
            .push(title_bar(popup, on_close));

        if let Some(search) = popup.search.as_ref() {
            let mut input = text_input(&search.placeholder, &search.term)
                .padding([4, 8])
                .width(Length::Fill);
            if let Some(on_search) = on_search {
                input = input.on_input(on_search);
            }

            let mut search_row = Row::new().spacing(TAB_SPACING).push(input);
            if search.clearable() {
                if let Some(message) = on_clear_search {
                    search_row =
                        search_row.push(button(text("Clear")).on_press(message));
                }
            }
            header = header.push(search_row);
        }

        header = header.push(level_tabs(popup, on_category.as_deref()));

        let mut rows = Column::new().spacing(spacing).width(Length::Fill);
        if popup.rows.is_empty() && popup.mode == ViewMode::Search {
            rows = rows.push(container(text("No matches")).padding([4, 8]));
        }

        for (index, row) in popup.rows.iter().enumerate() {
            let context = OptionRowContext {
                index,
                row,
                is_highlighted: row.highlighted,
                is_hovered: hovered == Some(index),
            };

            let mut element = render_row(&context);
            if let Some(ref row_style) = row_style {
                let style = row_style(&context);
                element = container(element)
                    .width(Length::Fill)
                    .style(move |_| style)
                    .into();
            }

            rows = rows.push(wrap_mouse_area(
                element,
                on_option.as_deref(),
                on_hover.as_deref(),
                index,
            ));
        }

        let body: Element<'a, Message> = if popup.fixed_header {
            Column::new()
                .spacing(SECTION_SPACING)
                .push(header)
                .push(scrollable(rows).height(Length::Fill))
                .into()
        } else {
            scrollable(
                Column::new()
                    .spacing(SECTION_SPACING)
                    .push(header)
                    .push(rows),
            )
            .height(Length::Fill)
            .into()
        };

        container(body)
            .padding(12)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn title_bar<'a, Message: Clone + 'a>(
    popup: &'a PopupView,
    on_close: Option<Message>,
) -> Element<'a, Message> {
    let mut bar = Row::new()
        .spacing(SECTION_SPACING)
        .push(text(popup.title.as_str()).size(TITLE_SIZE))
        .push(Space::new().width(Length::Fill));

    if let Some(message) = on_close {
        bar = bar.push(button(text("Close")).on_press(message));
    }

    bar.into()
}

fn level_tabs<'a, Message: Clone + 'a>(
    popup: &'a PopupView,
    on_category: Option<&(dyn Fn(usize) -> Message + 'a)>,
) -> Element<'a, Message> {
    let mut tabs = Row::new().spacing(TAB_SPACING);

    for tab in &popup.tabs {
        let caption = match tab.chosen.as_deref() {
            Some(chosen) => format!("{}: {chosen}", tab.caption),
            None => tab.caption.clone(),
        };
        let style: TabStyle = if tab.active {
            button::primary
        } else {
            button::secondary
        };

        let mut tab_button = button(text(caption)).style(style);
        if let Some(on_category) = on_category {
            tab_button = tab_button.on_press(on_category(tab.level));
        }
        tabs = tabs.push(tab_button);
    }

    tabs.into()
}

fn default_row<'a, Message: 'a>(
    context: &OptionRowContext<'a>,
) -> Element<'a, Message> {
    let row = context.row;
    let mut line = Row::new()
        .spacing(SECTION_SPACING)
        .push(text(row.label.as_str()));

    if let Some(ancestors) = row.context.as_deref() {
        line = line.push(text(ancestors).size(CONTEXT_SIZE));
    }
    if row.has_children {
        line = line.push(Space::new().width(Length::Fill)).push(text(">"));
    }

    let is_highlighted = context.is_highlighted;
    container(line)
        .padding([4, 8])
        .width(Length::Fill)
        .style(move |theme: &Theme| default_row_style(theme, is_highlighted))
        .into()
}

fn default_row_style(theme: &Theme, is_highlighted: bool) -> container::Style {
    if !is_highlighted {
        return container::Style::default();
    }

    let pair = theme.extended_palette().primary.weak;
    container::Style {
        background: Some(pair.color.into()),
        text_color: Some(pair.text),
        ..Default::default()
    }
}

fn wrap_mouse_area<'a, Message: Clone + 'a>(
    element: Element<'a, Message>,
    on_press: Option<&(dyn Fn(usize) -> Message + 'a)>,
    on_hover: Option<&(dyn Fn(Option<usize>) -> Message + 'a)>,
    index: usize,
) -> Element<'a, Message> {
    if on_press.is_none() && on_hover.is_none() {
        return element;
    }

    let mut area = mouse_area(element);

    if let Some(on_press) = on_press {
        area = area.on_press(on_press(index));
    }

    if let Some(on_hover) = on_hover {
        area = area.on_enter(on_hover(Some(index))).on_exit(on_hover(None));
    }

    area.interaction(mouse::Interaction::Pointer).into()
}
