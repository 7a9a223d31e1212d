//! Hero section component

use leptos::*;

use crate::MAP_HEADING;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>{MAP_HEADING}</h1>
            <p class="subtitle">
                "PET export and import quantities per trading partner. "
                "Green: the selected countries export more than they import. Red: the reverse. Gray: balanced."
            </p>
        </div>
    }
}
