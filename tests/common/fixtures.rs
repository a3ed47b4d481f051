use mapleads::map_page::VARIATION_MARKER;

/// Rendered search-results snapshot with three listings, each reachable
/// through a different name strategy:
///
/// - "Webmarko Agence Digital": listing title in the results feed
/// - "NassimSEO Création Site Web": place-link segment plus visible title
/// - "Atlas Web Studio": embedded data payload only
///
/// The first two phone numbers are rendered next to their listings in an
/// already-normalized form; the third is spaced out, so its normalized form
/// never occurs literally in the page and can only reach a record through
/// the positional fallback. The data payload carries one candidate website
/// per listing alongside platform URLs that the extractor must reject.
pub fn search_snapshot() -> String {
    r##"<!DOCTYPE html>
<html lang="fr">
<head><title>agence web casablanca - Recherche</title></head>
<body>
<div role="main" aria-label="Résultats pour agence web casablanca">
  <div class="app-bar"><button aria-label="Rechercher">Rechercher</button><span>Tous les filtres</span></div>
  <div role="feed" tabindex="-1">
    <div role="article" aria-label="Webmarko Agence Digital" data-result-index="1" jsaction="mouseover:pane.focus">
      <h3>Webmarko Agence Digital</h3>
      <span class="W4Efsd">4,5(12) · Agence de marketing</span>
      <div class="W4Efsd">Ouvert · 0661-511183</div>
    </div>
    <div role="article" aria-label="NassimSEO Création Site Web" data-result-index="2" jsaction="mouseover:pane.focus">
      <a href="https://www.google.com/maps/place/NassimSEO+Cr%C3%A9ation+Site+Web/@33.58,-7.61,17z/data=!4m6!3m5" aria-label="NassimSEO Création Site Web">
        <span class="fontHeadlineSmall">NassimSEO Création Site Web</span>
      </a>
      <div class="W4Efsd">5,0(8) · Concepteur de sites Web</div>
      <div class="W4Efsd">Ouvert · 0662334455</div>
    </div>
    <div role="article" data-result-index="3" jsaction="mouseover:pane.focus">
      <a href="https://www.google.com/maps/place/0ahUKEwjW8tr3xKmJAxXkTqQEHRkZB0MQ/@33.59,-7.62,15z">
        <span class="fontHeadlineSmall"></span>
      </a>
    </div>
    <span class="fontBodyMedium">Très bonne agence, je recommande vivement</span>
    <span class="fontBodyMedium">2,3 km · Ouvert actuellement</span>
    <h3>Partager</h3>
  </div>
</div>
<div class="footer-contact">Standard Rabat : 05 37 12 34 56</div>
<script>window.APP_INITIALIZATION_STATE=[[["Atlas Web Studio",null,null,null,null,[[33.57,-7.6]]],["https://webmarko.ma",null,1],["https://www.nassimseo.com",null,2],["https://atlasweb.ma",null,3],["https://www.google.com/maps/preview",null],["https://lh3.googleusercontent.com/p/AF1QipNrEXAMPLEtrackingtoken12345",null]]];</script>
</body>
</html>
"##
    .to_string()
}

/// [`search_snapshot`] with one variation capture appended after the
/// content marker, contributing a fourth listing and its website.
pub fn search_snapshot_with_variation() -> String {
    let appendix = r##"<!DOCTYPE html>
<html lang="fr">
<body>
<div role="main">
  <div role="feed" tabindex="-1">
    <div role="article" aria-label="Fennec Digital Solutions" data-result-index="1" jsaction="mouseover:pane.focus">
      <h3>Fennec Digital Solutions</h3>
      <div class="W4Efsd">Ouvert · 0770-112233</div>
    </div>
  </div>
</div>
<script>window.APP_INITIALIZATION_STATE=[[["https://fennecdigital.ma",null,4]]];</script>
</body>
</html>
"##;
    format!("{}{}{}", search_snapshot(), VARIATION_MARKER, appendix)
}

/// Page chrome, ratings and review text only. Every extractor should come
/// back empty-handed.
pub fn noise_snapshot() -> String {
    r##"<!DOCTYPE html>
<html lang="fr">
<body>
<div role="main">
  <div role="feed">
    <h3>Partager</h3>
    <h3>Ouvert actuellement</h3>
    <span class="fontBodyMedium">Très bonne expérience, je recommande</span>
    <span class="fontBodyMedium">4,5(12) · 2,3 km</span>
  </div>
</div>
<script>window.APP_INITIALIZATION_STATE=[[["https://www.google.com/maps/preview",null]]];</script>
</body>
</html>
"##
    .to_string()
}

/// Minimal business homepage with the given contact emails in the footer,
/// served by the wiremock helpers during fetch tests.
pub fn business_site_html(name: &str, emails: &[&str]) -> String {
    let contacts: String = emails
        .iter()
        .map(|e| format!("<p>Email : <a href=\"mailto:{e}\">{e}</a></p>"))
        .collect();
    format!(
        "<!DOCTYPE html><html lang=\"fr\"><head><title>{name}</title></head><body>\
         <header><h1>{name}</h1><nav>Accueil · Services · Contact</nav></header>\
         <main><p>Agence digitale à Casablanca. Devis gratuit.</p></main>\
         <footer>{contacts}<p>© 2024 {name}</p></footer>\
         </body></html>"
    )
}
