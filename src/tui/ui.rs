use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{LibraryBrowser, MessageList, PickerMenu, TitleBar};
use crate::tui::{Overlay, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(tui.composer.height())]);
    let [title_area, main_area, composer_area] = layout.areas(frame.area());

    MessageList::new(&mut tui.message_list, &app.store).render(frame, main_area);

    // Title bar reads the unseen flag the list just computed
    TitleBar::new(
        app.status_message.clone(),
        tui.composer.state().pending_images().len(),
        tui.message_list.has_unseen_content,
    )
    .render(frame, title_area);

    tui.composer.render(frame, composer_area);

    match &mut tui.overlay {
        Overlay::None => {}
        Overlay::Picker(menu) => PickerMenu::new(menu).render(frame, frame.area()),
        Overlay::Library(browser) => LibraryBrowser::new(browser).render(frame, frame.area()),
    }
}

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
