//! Static template pages.
//!
//! Every page here renders one fixed template with no parameters. Pages are
//! split into those behind the login guard and those open to everyone; the
//! route path is the template file name.

use askama::Template;
use axum::{Router, response::Html, routing::get};

use crate::error::AppError;
use crate::state::AppState;
use crate::web::handlers::render;

/// Declares page handlers and the routers serving them.
///
/// Each `handler => "file.html"` entry produces an async handler rendering
/// `templates/file.html`, mounted at `/file.html`.
macro_rules! static_pages {
    (
        protected: [ $( $p_handler:ident => $p_file:tt ),* $(,)? ],
        public: [ $( $handler:ident => $file:tt ),* $(,)? ] $(,)?
    ) => {
        $(
            pub async fn $p_handler() -> Result<Html<String>, AppError> {
                #[derive(Template)]
                #[template(path = $p_file)]
                struct Page {}

                render(&Page {})
            }
        )*

        $(
            pub async fn $handler() -> Result<Html<String>, AppError> {
                #[derive(Template)]
                #[template(path = $file)]
                struct Page {}

                render(&Page {})
            }
        )*

        /// Pages that require a logged-in session.
        pub fn protected_page_routes() -> Router<AppState> {
            Router::new()
                $( .route(concat!("/", $p_file), get($p_handler)) )*
        }

        /// Pages open to anonymous visitors.
        pub fn public_page_routes() -> Router<AppState> {
            Router::new()
                $( .route(concat!("/", $file), get($handler)) )*
        }

        /// Route paths of the pages behind the login guard.
        pub const PROTECTED_PAGE_PATHS: &[&str] = &[ $( concat!("/", $p_file) ),* ];

        /// Route paths of the pages open to everyone.
        pub const PUBLIC_PAGE_PATHS: &[&str] = &[ $( concat!("/", $file) ),* ];
    };
}

static_pages! {
    protected: [
        agile_board => "agile_board.html",
        article => "article.html",
        layouts => "layouts.html",
    ],
    public: [
        badges_labels => "badges_labels.html",
        basic_gallery => "basic_gallery.html",
        blog => "blog.html",
        buttons => "buttons.html",
        c3 => "c3.html",
        calendar => "calendar.html",
        carousel => "carousel.html",
        chat_view => "chat_view.html",
        clients => "clients.html",
        clipboard => "clipboard.html",
        code_editor => "code_editor.html",
        contacts => "contacts.html",
        contacts_2 => "contacts_2.html",
        css_animation => "css_animation.html",
        dashboard_2 => "dashboard_2.html",
        dashboard_3 => "dashboard_3.html",
        dashboard_4 => "dashboard_4.html",
        dashboard_4_1 => "dashboard_4_1.html",
        dashboard_5 => "dashboard_5.html",
        diff => "diff.html",
        draggable_panels => "draggable_panels.html",
        ecommerce_cart => "ecommerce-cart.html",
        ecommerce_orders => "ecommerce-orders.html",
        ecommerce_payments => "ecommerce_payments.html",
        ecommerce_product => "ecommerce_product.html",
        ecommerce_product_detail => "ecommerce_product_detail.html",
        ecommerce_product_grid => "ecommerce_product_grid.html",
        ecommerce_product_list => "ecommerce_product_list.html",
        email_template => "email_template.html",
        empty_page => "empty_page.html",
        faq => "faq.html",
        file_manager => "file_manager.html",
        forgot_password => "forgot_password.html",
        form_advanced => "form_advanced.html",
        form_basic => "form_basic.html",
        form_editors => "form_editors.html",
        form_file_upload => "form_file_upload.html",
        form_markdown => "form_markdown.html",
        form_wizard => "form_wizard.html",
        forum_main => "forum_main.html",
        forum_post => "forum_post.html",
        full_height => "full_height.html",
        google_maps => "google_maps.html",
        graph_chartist => "graph_chartist.html",
        graph_chartjs => "graph_chartjs.html",
        graph_flot => "graph_flot.html",
        graph_morris => "graph_morris.html",
        graph_peity => "graph_peity.html",
        graph_rickshow => "graph_rickshow.html",
        graph_sparkline => "graph_sparkline.html",
        grid_options => "grid_options.html",
        i18support => "i18support.html",
        icons => "icons.html",
        idle_timer => "idle_timer.html",
        invoice => "invoice.html",
        invoice_print => "invoice_print.html",
        issue_tracker => "issue_tracker.html",
        jq_grid => "jq_grid.html",
        landing => "landing.html",
        loading_buttons => "loading_buttons.html",
        lockscreen => "lockscreen.html",
        login_two_columns => "login_two_columns.html",
        mail_compose => "mail_compose.html",
        mail_detail => "mail_detail.html",
        mailbox => "mailbox.html",
        masonry => "masonry.html",
        md_skin => "md-skin.html",
        metrics => "metrics.html",
        modal_window => "modal_window.html",
        nestable_list => "nestable_list.html",
        notifications => "notifications.html",
        off_canvas_menu => "off_canvas_menu.html",
        package => "package.html",
        pin_board => "pin_board.html",
        profile => "profile.html",
        profile_2 => "profile_2.html",
        project_detail => "project_detail.html",
        projects => "projects.html",
        register => "register.html",
        resizeable_panels => "resizeable_panels.html",
        search_results => "search_results.html",
        skin_config => "skin-config.html",
        slick_carousel => "slick_carousel.html",
        social_feed => "social_feed.html",
        spinners => "spinners.html",
        sweetalert => "sweetalert.html",
        table_basic => "table_basic.html",
        table_data_tables => "table_data_tables.html",
        table_foo_table => "table_foo_table.html",
        tabs => "tabs.html",
        tabs_panels => "tabs_panels.html",
        teams_board => "teams_board.html",
        timeline => "timeline.html",
        timeline_2 => "timeline_2.html",
        tinycon => "tinycon.html",
        toastr_notifications => "toastr_notifications.html",
        tour => "tour.html",
        tree_view => "tree_view.html",
        truncate => "truncate.html",
        typography => "typography.html",
        validation => "validation.html",
        video => "video.html",
        vote_list => "vote_list.html",
        widgets => "widgets.html",
    ],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_paths_are_unique() {
        let mut paths: Vec<&str> = PROTECTED_PAGE_PATHS
            .iter()
            .chain(PUBLIC_PAGE_PATHS)
            .copied()
            .collect();
        let total = paths.len();
        paths.sort_unstable();
        paths.dedup();

        assert_eq!(paths.len(), total);
    }

    #[test]
    fn test_dynamic_pages_not_static() {
        for path in ["/login.html", "/index.html"] {
            assert!(!PROTECTED_PAGE_PATHS.contains(&path));
            assert!(!PUBLIC_PAGE_PATHS.contains(&path));
        }
    }

    #[test]
    fn test_protected_pages() {
        assert_eq!(
            PROTECTED_PAGE_PATHS,
            &["/agile_board.html", "/article.html", "/layouts.html"]
        );
        assert!(!PUBLIC_PAGE_PATHS.contains(&"/agile_board.html"));
    }

    #[test]
    fn test_page_renders_template() {
        #[derive(Template)]
        #[template(path = "blog.html")]
        struct Blog {}

        let html = Blog {}.render().unwrap();
        assert!(html.contains("<title>Blog | Tempus Fugit</title>"));
    }
}
