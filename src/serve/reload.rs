// src/serve/reload.rs

//! Reload control channel.
//!
//! A WebSocket listener on port+1 fans reload notifications out to connected
//! browser clients. Stylesheet rebuilds are injected in place; everything
//! else gets a full page reload. The listener also serves `/client.js`, the
//! browser-side helper a page can include with a single script tag.

use serde::Serialize;

use crate::assets::AssetKind;

/// Notification pushed to connected clients after a successful task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReloadMessage {
    /// Full page reload.
    Reload,
    /// Re-link stylesheets in place, no navigation.
    InjectStyles,
}

impl ReloadMessage {
    /// Scope of the notification for a given asset class: style changes are
    /// injected, markup/script/static changes reload the page.
    pub fn for_class(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Styles => ReloadMessage::InjectStyles,
            _ => ReloadMessage::Reload,
        }
    }
}

/// Browser helper served at `/client.js` on the control port. Connects to
/// the reload socket, retries on disconnect, and applies either a full
/// reload or an in-place stylesheet refresh depending on the payload.
pub const CLIENT_SCRIPT_TEMPLATE: &str = r#"(function () {
  'use strict';
  var url = 'ws://' + location.hostname + ':__PORT__/reload';

  function refreshStylesheets() {
    var links = document.querySelectorAll('link[rel="stylesheet"]');
    for (var i = 0; i < links.length; i++) {
      var link = links[i];
      var href = link.getAttribute('href').replace(/[?&]v=\d+$/, '');
      var sep = href.indexOf('?') === -1 ? '?' : '&';
      link.setAttribute('href', href + sep + 'v=' + Date.now());
    }
  }

  function connect() {
    try {
      var ws = new WebSocket(url);
      ws.onmessage = function (ev) {
        var msg;
        try { msg = JSON.parse(ev.data); } catch (_e) { return; }
        if (msg.kind === 'inject-styles') {
          refreshStylesheets();
        } else if (msg.kind === 'reload') {
          window.location.reload();
        }
      };
      ws.onclose = function () { setTimeout(connect, 500); };
      ws.onerror = function () { try { ws.close(); } catch (_e) {} };
    } catch (_e) {
      setTimeout(connect, 500);
    }
  }

  connect();
})();
"#;

/// Render the client script for a concrete control port.
pub fn client_script(control_port: u16) -> String {
    CLIENT_SCRIPT_TEMPLATE.replace("__PORT__", &control_port.to_string())
}
