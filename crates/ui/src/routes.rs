use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{AssessmentView, HistoryView, HomeView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/assessment", AssessmentView)] Assessment {},
        #[route("/history", HistoryView)] History {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

/// Navigation plus the signed-in user, kept live through the app-state stream.
#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let mut user = use_signal(|| ctx.app_state().current_user());

    use_future(move || {
        let mut users = ctx.app_state().subscribe();
        async move {
            while users.changed().await.is_ok() {
                let current = users.borrow_and_update().clone();
                user.set(current);
            }
        }
    });

    let who = user
        .read()
        .as_ref()
        .map_or_else(|| "Guest".to_owned(), |u| u.name.clone());
    let signed_in = user.read().is_some();

    rsx! {
        nav { class: "sidebar",
            h1 { "Assess" }
            p { class: "sidebar-user", "{who}" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                if signed_in {
                    li { Link { to: Route::History {}, "History" } }
                }
            }
        }
    }
}
