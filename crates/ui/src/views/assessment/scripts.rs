/// Reports `document.hidden` on every visibility change until the page goes away.
pub(super) const VISIBILITY_SCRIPT: &str = r#"
    const report = () => dioxus.send(document.hidden);
    document.addEventListener("visibilitychange", report);
    window.addEventListener("blur", () => dioxus.send(true));
    window.addEventListener("focus", () => dioxus.send(false));
    await new Promise(() => {});
"#;
