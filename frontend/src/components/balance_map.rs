//! The trade balance map.
//!
//! Every selection change posts the picked countries to `/api/map`. A ready
//! response is drawn with `Plotly.react`; an empty selection shows the prompt
//! instead. Only the latest selection may touch the view: older responses
//! are dropped and the loading flag belongs to the newest request.

use leptos::*;

use crate::services::{clear_figure, draw_figure, fetch_map};
use crate::types::{MapResponse, MapStatus};
use crate::{BACKEND_URL, MAP_ELEMENT_ID, SELECTION_PROMPT};

/// Ids for map requests. Clearing the selection counts as a request too.
#[derive(Debug, Default, Clone, Copy)]
struct RequestSeq(u64);

impl RequestSeq {
    fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    fn is_current(&self, id: u64) -> bool {
        self.0 == id
    }
}

#[component]
pub fn BalanceMap(selected: ReadSignal<Vec<String>>) -> impl IntoView {
    let (response, set_response) = create_signal(None::<MapResponse>);
    let (error, set_error) = create_signal(None::<String>);
    let (loading, set_loading) = create_signal(false);
    let request_seq = store_value(RequestSeq::default());

    create_effect(move |_| {
        let countries = selected.get();
        let id = request_seq.try_update_value(RequestSeq::next).unwrap_or_default();

        if countries.is_empty() {
            clear_figure(MAP_ELEMENT_ID);
            set_loading.set(false);
            set_response.set(None);
            set_error.set(None);
            return;
        }

        set_loading.set(true);
        spawn_local(async move {
            let result = fetch_map(BACKEND_URL, countries).await;

            if !request_seq.with_value(|seq| seq.is_current(id)) {
                return;
            }
            set_loading.set(false);

            match result {
                Ok(map) => {
                    if let (MapStatus::Ready, Some(figure)) = (map.status, map.figure.as_ref()) {
                        if let Err(e) = draw_figure(MAP_ELEMENT_ID, figure).await {
                            log::error!("{}", e);
                            set_error.set(Some(e.to_string()));
                            return;
                        }
                    }
                    set_error.set(None);
                    set_response.set(Some(map));
                }
                Err(e) => {
                    log::error!("Map request failed: {}", e);
                    clear_figure(MAP_ELEMENT_ID);
                    set_response.set(None);
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    });

    let prompt = move || {
        response
            .get()
            .and_then(|r| r.prompt)
            .unwrap_or_else(|| SELECTION_PROMPT.to_string())
    };

    view! {
        <div class="balance-map">
            <Show when=move || selected.get().is_empty() fallback=|| view! {}>
                <p class="prompt">{prompt}</p>
            </Show>
            <Show when=move || loading.get() fallback=|| view! {}>
                <p class="loading">"Aggregating…"</p>
            </Show>
            {move || error.get().map(|e| view! { <p class="error">{e}</p> })}

            // always in the DOM so Plotly can draw into it
            <div id=MAP_ELEMENT_ID></div>

            <UnplottedPartners response=response/>
        </div>
    }
}

/// Partners that count in the totals but have no coordinates.
#[component]
fn UnplottedPartners(response: ReadSignal<Option<MapResponse>>) -> impl IntoView {
    let rows = move || {
        response.get().map(|r| {
            r.aggregates
                .into_iter()
                .filter(|a| r.unplotted.contains(&a.partner))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <Show when=move || rows().map(|r| !r.is_empty()).unwrap_or(false) fallback=|| view! {}>
            <div class="unplotted">
                <h3>"Partners not on the map"</h3>
                <table>
                    <thead>
                        <tr>
                            <th>"Country"</th>
                            <th>"Partner"</th>
                            <th>"Export (Kg)"</th>
                            <th>"Import (Kg)"</th>
                            <th>"Balance (Kg)"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || rows().unwrap_or_default()
                            key=|a| (a.country.clone(), a.partner.clone())
                            children=move |a| {
                                view! {
                                    <tr>
                                        <td>{a.country}</td>
                                        <td>{a.partner}</td>
                                        <td>{format_thousands(a.export_quantity)}</td>
                                        <td>{format_thousands(a.import_quantity)}</td>
                                        <td>{format_thousands(a.balance)}</td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
        </Show>
    }
}

/// Whole Kg with `,` thousands separators, as in the map's hover text.
fn format_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 && digits != "0" {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
