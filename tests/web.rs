// Browser tests: `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

// `#hairCanvas` is deliberately not a canvas: the hair effect fails to bind
// and everything else must keep working.
const FIXTURE: &str = r#"
<div id="scroller" style="height:100px; overflow:auto; position:relative;">
  <section id="background" class="section" style="height:5000px;">
    <div id="bgCopy">
      <p class="reveal-line">Roughly 50 hairs a day.</p>
      <p class="reveal-line">protective when attached</p>
    </div>
    <div id="bgVisuals"></div>
  </section>
</div>
<div id="hairCanvas"></div>
<p class="prompt" data-prompt="origin">Where did it come from?</p>
<textarea id="originText" class="hidden"></textarea>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn count(selector: &str) -> u32 {
    document().query_selector_all(selector).unwrap().length()
}

fn element(selector: &str) -> HtmlElement {
    document().query_selector(selector).unwrap().unwrap().dyn_into().unwrap()
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

// One test owns the page: listeners and start state live for the whole run.
#[wasm_bindgen_test]
async fn narrative_page_lifecycle() {
    document().body().unwrap().set_inner_html(FIXTURE);

    assert!(strand_archive::start_narrative().is_ok());
    assert_eq!(count("#bgCopy span.word"), 6);
    assert!(strand_archive::start_narrative().is_ok());
    assert_eq!(count("#bgCopy span.word"), 6);
    assert_eq!(count("span.word span.word"), 0);

    // a single listener per toggle: one click opens, the next closes
    let toggle = element("[data-prompt=\"origin\"]");
    toggle.click();
    assert_eq!(toggle.get_attribute("aria-expanded").as_deref(), Some("true"));
    assert!(!element("#originText").class_list().contains("hidden"));
    toggle.click();
    assert_eq!(toggle.get_attribute("aria-expanded").as_deref(), Some("false"));

    strand_archive::spawn_burst(10.0, 10.0, 5);

    // scroll to the end: everything reveals and a panel is attached
    let scroller = element("#scroller");
    scroller.set_scroll_top(5000);
    scroller.dispatch_event(&Event::new("scroll").unwrap()).unwrap();
    assert_eq!(count("#bgCopy span.word.revealed"), 6);
    assert!(count("#bgVisuals .visItem") >= 1);

    // the frame loop runs despite the broken canvas and shows the panel
    sleep(600).await;
    assert_eq!(count("#bgVisuals .visItem.visible"), 1);
}

#[wasm_bindgen_test]
fn bad_config_is_rejected() {
    assert!(strand_archive::start_narrative_with_config("{\"keywords\": 3}").is_err());
}
