//! Reporting country picker.
//!
//! Loads the country list from the backend once, then reports the picked
//! countries, in list order, on every change.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlOptionElement, HtmlSelectElement};

use crate::services::fetch_countries;
use crate::BACKEND_URL;

#[component]
pub fn CountrySelect(set_selected: WriteSignal<Vec<String>>) -> impl IntoView {
    let (countries, set_countries) = create_signal(Vec::<String>::new());
    let (summary, set_summary) = create_signal(None::<String>);
    let (error, set_error) = create_signal(None::<String>);
    let select_ref = create_node_ref::<leptos::html::Select>();

    spawn_local(async move {
        match fetch_countries(BACKEND_URL).await {
            Ok(response) => {
                log::info!("🌍 {} reporting countries", response.countries.len());
                set_summary.set(Some(format!(
                    "{} rows kept, {} dropped",
                    response.report.rows_kept, response.report.rows_dropped
                )));
                set_countries.set(response.countries);
            }
            Err(e) => {
                log::error!("Failed to load countries: {}", e);
                set_error.set(Some(e.to_string()));
            }
        }
    });

    let on_change = move |ev: Event| {
        let select: HtmlSelectElement = event_target(&ev);
        set_selected.set(selected_values(&select));
    };

    let on_clear = move |_| {
        if let Some(select) = select_ref.get() {
            let options = select.options();
            for i in 0..options.length() {
                if let Some(option) = options.item(i).and_then(|o| o.dyn_into::<HtmlOptionElement>().ok()) {
                    option.set_selected(false);
                }
            }
        }
        set_selected.set(Vec::new());
    };

    view! {
        <div class="country-select">
            <label for="countries">"Reporting countries"</label>
            <select id="countries" multiple=true node_ref=select_ref on:change=on_change>
                <For
                    each=move || countries.get()
                    key=|country| country.clone()
                    children=move |country| {
                        let label = country.clone();
                        view! { <option value=country>{label}</option> }
                    }
                />
            </select>
            <div class="hint">
                "Ctrl/Cmd-click to pick several. "
                <button on:click=on_clear>"Clear"</button>
                {move || summary.get().map(|s| view! { <span>" " {s}</span> })}
            </div>
            {move || error.get().map(|e| view! { <p class="error">{e}</p> })}
        </div>
    }
}

fn selected_values(select: &HtmlSelectElement) -> Vec<String> {
    let options = select.selected_options();
    (0..options.length())
        .filter_map(|i| options.item(i))
        .filter_map(|el| el.dyn_into::<HtmlOptionElement>().ok())
        .map(|option| option.value())
        .collect()
}
