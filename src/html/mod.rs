// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static HTML served by the application.

/// Index page: kind selector, search, info panel, map frame and chat.
///
/// All data is fetched from the JSON API; the map is an iframe pointing at
/// the territory's `/map` document.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Recherche de territoires</title>
<style>
  body { font-family: sans-serif; margin: 0; display: grid; grid-template-columns: 360px 1fr; height: 100vh; }
  aside { padding: 1rem; overflow-y: auto; border-right: 1px solid #ddd; }
  main { display: grid; grid-template-rows: 1fr auto; }
  iframe { width: 100%; height: 100%; border: 0; }
  ul#results { list-style: none; padding: 0; }
  ul#results li { padding: .3rem; cursor: pointer; }
  ul#results li:hover { background: #eef4fc; }
  #chat { border-top: 1px solid #ddd; padding: .5rem 1rem; max-height: 40vh; overflow-y: auto; }
  .turn-user { font-weight: bold; }
  .muted { color: #777; }
</style>
</head>
<body>
<aside>
  <h1>Territoires</h1>
  <label for="kind">Type</label>
  <select id="kind"></select>
  <input id="query" type="search" placeholder="Nom ou code" maxlength="100">
  <p id="status" class="muted"></p>
  <ul id="results"></ul>
  <section id="info" hidden>
    <h2 id="info-title"></h2>
    <p>Code : <span id="info-code"></span></p>
    <p><a id="info-dossier" target="_blank" rel="noopener">Dossier complet INSEE</a></p>
    <p><a id="info-download">Télécharger le contour (GeoJSON)</a></p>
    <p id="info-source" class="muted"></p>
    <h3>Indicateurs</h3>
    <ul id="indicators"></ul>
  </section>
</aside>
<main>
  <iframe id="map" src="about:blank" title="Carte"></iframe>
  <section id="chat">
    <div id="transcript"></div>
    <form id="chat-form">
      <input id="question" placeholder="Posez une question sur ce territoire" maxlength="2000" disabled>
      <button type="submit" disabled>Envoyer</button>
    </form>
  </section>
</main>
<script>
const $ = (id) => document.getElementById(id);
let searchTimer = null;

async function api(path, options) {
  const res = await fetch(path, Object.assign({ credentials: "same-origin" }, options));
  const body = await res.json().catch(() => ({}));
  if (!res.ok) { throw new Error(body.details || body.error || res.statusText); }
  return body;
}

function renderTranscript(turns) {
  $("transcript").innerHTML = "";
  for (const t of turns) {
    const p = document.createElement("p");
    p.className = "turn-" + t.role;
    p.textContent = (t.role === "user" ? "Vous : " : "Assistant : ") + t.text;
    $("transcript").appendChild(p);
  }
}

async function loadKinds() {
  const kinds = await api("/api/kinds");
  for (const k of kinds) {
    const opt = document.createElement("option");
    opt.value = k.id;
    opt.textContent = k.label;
    $("kind").appendChild(opt);
  }
}

async function runSearch() {
  const params = new URLSearchParams({ kind: $("kind").value, q: $("query").value });
  try {
    const res = await api("/api/territories?" + params);
    $("status").textContent = res.catalog_size === 0
      ? "Catalogue indisponible"
      : res.results.length + " résultat(s)";
    $("results").innerHTML = "";
    for (const t of res.results) {
      const li = document.createElement("li");
      li.textContent = t.display;
      li.onclick = () => selectTerritory(t.kind, t.code);
      $("results").appendChild(li);
    }
  } catch (e) {
    $("status").textContent = e.message;
  }
}

async function selectTerritory(kind, code) {
  try {
    const info = await api("/api/territories/" + kind + "/" + encodeURIComponent(code));
    $("info").hidden = false;
    $("info-title").textContent = info.title;
    $("info-code").textContent = info.code;
    $("info-dossier").href = info.dossier_url;
    $("info-download").href = info.download_url;
    $("info-download").hidden = !info.boundary_available;
    $("info-source").textContent = info.boundary_available
      ? "Contour : " + info.boundary_source
      : "Contour géographique indisponible";
    $("map").src = info.map_url;
    if (info.chat_reset) { renderTranscript([]); }
    $("question").disabled = false;
    document.querySelector("#chat-form button").disabled = false;

    const indicators = await api("/api/territories/" + kind + "/" + encodeURIComponent(code) + "/indicators");
    $("indicators").innerHTML = "";
    for (const [name, value] of Object.entries(indicators)) {
      const li = document.createElement("li");
      li.textContent = name + " : " + value.toLocaleString("fr-FR");
      $("indicators").appendChild(li);
    }
  } catch (e) {
    $("status").textContent = e.message;
  }
}

$("query").addEventListener("input", () => {
  clearTimeout(searchTimer);
  searchTimer = setTimeout(runSearch, 250);
});
$("kind").addEventListener("change", runSearch);

$("chat-form").addEventListener("submit", async (ev) => {
  ev.preventDefault();
  const question = $("question").value.trim();
  if (!question) { return; }
  $("question").value = "";
  try {
    const res = await api("/api/chat", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ question }),
    });
    renderTranscript(res.transcript);
  } catch (e) {
    $("status").textContent = e.message;
  }
});

loadKinds().then(runSearch).then(() => api("/api/chat")).then((t) => renderTranscript(t.transcript));
</script>
</body>
</html>
"##;
