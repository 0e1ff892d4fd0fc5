//! Overlay listing the most recent file changes, newest first.

use leptos::prelude::*;

use crate::changes::ChangeFeedTracker;

/// Newest-first list of recorded changes, plus a count of dropped feed events.
#[component]
pub fn RecentChanges(
	#[prop(into)] tracker: Signal<ChangeFeedTracker>,
	/// Overrides the tracker's configured display limit.
	#[prop(optional)]
	limit: Option<usize>,
) -> impl IntoView {
	let entries = move || {
		tracker.with(|t| {
			let limit = limit.unwrap_or(t.config().display_limit);
			t.recent_changes(limit)
				.into_iter()
				.cloned()
				.collect::<Vec<_>>()
		})
	};
	let dropped = move || tracker.with(ChangeFeedTracker::dropped);

	view! {
		<section class="recent-changes">
			<h2>"Recent changes"</h2>
			{move || {
				let entries = entries();
				if entries.is_empty() {
					view! { <p class="recent-changes-empty">"No changes yet."</p> }.into_any()
				} else {
					view! {
						<ul>
							{entries
								.into_iter()
								.map(|change| {
									let kind = change.kind.as_str();
									view! {
										<li class=format!("change change-{kind}")>
											<span class="change-kind">{kind}</span>
											<span class="change-path">{change.path}</span>
											<time datetime=change.timestamp.to_rfc3339()>
												{change.timestamp.format("%H:%M:%S").to_string()}
											</time>
										</li>
									}
								})
								.collect_view()}
						</ul>
					}
						.into_any()
				}
			}}
			<Show when=move || { dropped() > 0 }>
				<p class="recent-changes-dropped">{move || format!("{} malformed event(s) ignored", dropped())}</p>
			</Show>
		</section>
	}
}
