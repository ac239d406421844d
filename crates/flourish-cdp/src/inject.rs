//! Injected page scripts.
//!
//! One helper object (`window.__flourish`) tracks editable regions and
//! exposes the editing commands; a second (`window.__flourishUi`) owns the
//! floating trigger button. Both report back to the backend through the
//! `__flourishEmit` binding as JSON payloads:
//!
//! ```text
//! {"kind": "mutation"}
//! {"kind": "signal", "region": 3, "signal": "input"}
//! {"kind": "click"}
//! ```

/// Name of the `Runtime.addBinding` channel back to the backend.
pub const BINDING_NAME: &str = "__flourishEmit";

/// Region tracking and editing commands.
///
/// Region ids are handed out per element and never reused, so a replaced
/// composer element always surfaces as a new id.
pub const PAGE_HELPER_JS: &str = r#"
(() => {
    if (window.__flourish) return;

    const state = { nextId: 1, byId: new Map(), ids: new WeakMap() };

    const idFor = (el) => {
        let id = state.ids.get(el);
        if (!id) {
            id = state.nextId++;
            state.ids.set(el, id);
        }
        state.byId.set(id, el);
        return id;
    };

    const lookup = (id) => {
        const el = state.byId.get(id);
        return el && el.isConnected ? el : null;
    };

    const emit = (payload) => {
        if (window.__flourishEmit) window.__flourishEmit(JSON.stringify(payload));
    };

    const hooked = new WeakSet();
    const hook = (el) => {
        if (hooked.has(el)) return;
        hooked.add(el);
        for (const kind of ['input', 'keyup', 'paste']) {
            el.addEventListener(kind, () => {
                emit({ kind: 'signal', region: idFor(el), signal: kind });
            });
        }
    };

    window.__flourish = {
        snapshot() {
            const regions = [];
            for (const el of document.querySelectorAll('[contenteditable="true"]')) {
                const id = idFor(el);
                hook(el);
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                regions.push({
                    id,
                    bounds: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
                    visible: style.visibility !== 'hidden' && style.display !== 'none',
                    tagName: el.tagName.toLowerCase(),
                    role: el.getAttribute('role'),
                    ariaLabel: el.getAttribute('aria-label'),
                });
            }
            return {
                viewport: { width: window.innerWidth, height: window.innerHeight },
                regions,
            };
        },
        readText(id) {
            const el = lookup(id);
            if (!el) return null;
            return el.innerText || '';
        },
        focus(id) {
            const el = lookup(id);
            if (!el) return null;
            el.focus();
            return true;
        },
        execCommand(id, command, value) {
            const el = lookup(id);
            if (!el) return null;
            el.focus();
            if (command === 'selectAll') window.getSelection().removeAllRanges();
            document.execCommand(command, false, value === undefined ? null : value);
            return true;
        },
        paste(id, text) {
            const el = lookup(id);
            if (!el) return null;
            const data = new DataTransfer();
            data.setData('text/plain', text);
            el.dispatchEvent(new ClipboardEvent('paste', {
                clipboardData: data,
                bubbles: true,
                cancelable: true,
                composed: true,
            }));
            return true;
        },
        input(id) {
            const el = lookup(id);
            if (!el) return null;
            el.dispatchEvent(new InputEvent('input', {
                bubbles: true,
                cancelable: true,
                composed: true,
                inputType: 'insertText',
            }));
            return true;
        },
        setText(id, text) {
            const el = lookup(id);
            if (!el) return null;
            el.innerHTML = '';
            el.innerText = text;
            return true;
        },
        collapseEnd(id) {
            const el = lookup(id);
            if (!el) return null;
            const selection = window.getSelection();
            const range = document.createRange();
            range.selectNodeContents(el);
            range.collapse(false);
            selection.removeAllRanges();
            selection.addRange(range);
            return true;
        },
        anchorRect(id) {
            const el = lookup(id);
            if (!el) return null;
            const rect = el.getBoundingClientRect();
            if (rect.width === 0 || rect.height === 0) return null;
            return { x: rect.x, y: rect.y, width: rect.width, height: rect.height };
        },
    };

    new MutationObserver(() => emit({ kind: 'mutation' }))
        .observe(document.documentElement, { childList: true, subtree: true });
})();
"#;

/// Floating trigger button.
pub const TRIGGER_HELPER_JS: &str = r#"
(() => {
    if (window.__flourishUi) return;

    const BUTTON_ID = 'flourish-trigger';
    const LABEL = '\u{1FAB6} Flourish';

    const button = () => document.getElementById(BUTTON_ID);

    window.__flourishUi = {
        mount() {
            if (button()) return;
            const btn = document.createElement('button');
            btn.id = BUTTON_ID;
            btn.innerText = LABEL;
            Object.assign(btn.style, {
                position: 'fixed',
                zIndex: '9999',
                display: 'none',
                padding: '8px 12px',
                backgroundColor: '#075E54',
                color: 'white',
                border: 'none',
                borderRadius: '20px',
                cursor: 'pointer',
                fontSize: '14px',
                fontWeight: 'bold',
                boxShadow: '0 2px 5px rgba(0,0,0,0.2)',
                transition: 'opacity 0.2s',
            });
            btn.onclick = (e) => {
                e.preventDefault();
                if (window.__flourishEmit) window.__flourishEmit(JSON.stringify({ kind: 'click' }));
            };
            document.body.appendChild(btn);
        },
        show() {
            const btn = button();
            if (btn) btn.style.display = 'block';
        },
        hide() {
            const btn = button();
            if (btn) btn.style.display = 'none';
        },
        setBusy(busy) {
            const btn = button();
            if (!btn) return;
            btn.disabled = busy;
            btn.innerText = busy ? '⏳ Rewriting...' : LABEL;
            btn.style.opacity = busy ? '0.7' : '1';
            btn.style.cursor = busy ? 'not-allowed' : 'pointer';
        },
        position(rect) {
            const btn = button();
            if (!btn) return;
            if (!rect || rect.width === 0 || rect.height === 0) {
                this.hide();
                return;
            }
            const own = btn.getBoundingClientRect();
            const top = rect.y - own.height - 8;
            const left = rect.x + rect.width - own.width;
            btn.style.top = `${Math.max(8, top)}px`;
            btn.style.left = `${Math.max(8, left)}px`;
        },
    };
})();
"#;

/// Render a Rust string as a JavaScript string literal.
pub fn js_string(text: &str) -> String {
    // JSON string syntax is valid JavaScript.
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
