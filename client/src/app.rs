use leptos::either::EitherOf3;
use leptos::prelude::*;

use crate::canvas::MapCanvas;
use crate::loader::{LoadedMap, load_map};

/// Newtype wrappers so the two `RwSignal<Option<String>>` contexts don't
/// overwrite each other.
#[derive(Clone, Copy)]
pub(crate) struct FocusedRegion(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct HoveredRegion(pub RwSignal<Option<String>>);

#[derive(Clone)]
enum LoadState {
    Loading,
    Ready(LoadedMap),
    Failed(String),
}

const OVERVIEW_HEADLINE: &str = "어디로 떠나볼까요?";
const OVERVIEW_HINT: &str = "지도에서 지역을 선택하세요";
const FOCUSED_HINT: &str = "도시를 선택하세요";

fn remove_loading_shell() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    if let Some(shell) = document.get_element_by_id("app-loading-shell") {
        shell.remove();
    }
}

#[component]
pub fn App() -> impl IntoView {
    let focused: RwSignal<Option<String>> = RwSignal::new(None);
    let hovered: RwSignal<Option<String>> = RwSignal::new(None);
    provide_context(FocusedRegion(focused));
    provide_context(HoveredRegion(hovered));

    let state: RwSignal<LoadState> = RwSignal::new(LoadState::Loading);

    wasm_bindgen_futures::spawn_local(async move {
        match load_map().await {
            Ok(map) => {
                tracing::info!(
                    features = map.registry.features().len(),
                    regions = map.registry.regions().len(),
                    "map data loaded"
                );
                state.set(LoadState::Ready(map));
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load map data");
                state.set(LoadState::Failed(e));
            }
        }
        remove_loading_shell();
    });

    let headline = move || focused.get().unwrap_or_else(|| OVERVIEW_HEADLINE.to_string());
    let hint = move || match (hovered.get(), focused.get()) {
        (Some(name), _) => name,
        (None, Some(_)) => FOCUSED_HINT.to_string(),
        (None, None) => OVERVIEW_HINT.to_string(),
    };

    view! {
        <div style="display: flex; flex-direction: column; width: 100%; height: 100%; background: #0f172a; color: #f8fafc;">
            <header style="padding: 20px 24px 8px; text-align: center;">
                <h1 style="margin: 0; font-size: 1.5rem; font-weight: 700;">{headline}</h1>
                <p style="margin: 6px 0 0; color: #94a3b8; min-height: 1.25em;">{hint}</p>
            </header>
            <main style="position: relative; flex: 1; min-height: 0;">
                {move || match state.get() {
                    LoadState::Loading => EitherOf3::A(view! {
                        <p style="text-align: center; color: #64748b;">"지도를 불러오는 중…"</p>
                    }),
                    LoadState::Failed(e) => EitherOf3::B(view! {
                        <p style="text-align: center; color: #f87171;">
                            {format!("지도를 불러오지 못했습니다: {e}")}
                        </p>
                    }),
                    LoadState::Ready(map) => EitherOf3::C(view! {
                        <MapCanvas registry=map.registry config=map.config />
                    }),
                }}
            </main>
        </div>
    }
}
