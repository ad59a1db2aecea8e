mod api;
mod components;
mod effects;
mod pages;
mod projection;

use dioxus::prelude::*;
use forecast360_shared::TopicId;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/topic/:id")]
    TopicView { id: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::dashboard::DashboardPage { initial_topic: None::<TopicId> }
    }
}

#[component]
fn TopicView(id: String) -> Element {
    let initial_topic = match id.parse::<TopicId>() {
        Ok(topic) => Some(topic),
        Err(e) => {
            tracing::warn!(%id, error = %e, "ignoring unknown topic in link");
            None
        }
    };
    rsx! {
        pages::dashboard::DashboardPage { initial_topic }
    }
}

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
