//! Static map preview renderer.
//!
//! Renders a single property location through the Mapbox Static Images API.
//! The renderer is a small state machine: missing coordinates and a missing
//! access token are short-circuit displays that never touch the network;
//! otherwise a fetch moves Loading to Loaded on successful decode, or to
//! Error with a fixed message and a credential remediation link.

use earthie_common::{AppError, AppResult, MAPBOX_TOKEN_ENV, MapboxAccess};

/// Lowest zoom level the preview allows.
pub const MIN_ZOOM: u8 = 1;

/// Highest zoom level the preview allows.
pub const MAX_ZOOM: u8 = 20;

/// Zoom level previews start at.
pub const DEFAULT_ZOOM: u8 = 14;

/// Shown when the preview has no coordinates to render.
pub const NO_LOCATION_MESSAGE: &str = "No location data available";

/// Shown when no Mapbox access token is configured.
pub const MISSING_TOKEN_MESSAGE: &str = "Mapbox token not configured";

/// Shown when the map image cannot be fetched or decoded.
pub const LOAD_ERROR_MESSAGE: &str =
    "Failed to load map. Please check your Mapbox token and coordinates.";

/// Heading of the error panel.
pub const ERROR_PANEL_TITLE: &str = "Error Loading Map";

/// Remediation link target on the error panel.
pub const TOKEN_SETTINGS_URL: &str = "https://account.mapbox.com/access-tokens/";

/// Remediation link label on the error panel.
pub const TOKEN_SETTINGS_LABEL: &str = "Check Mapbox Token Settings";

/// Static Images style endpoint the preview renders through.
const MAPBOX_STYLE_BASE: &str = "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/static";

/// Rendered image size, retina scaled.
const IMAGE_SIZE: &str = "600x400@2x";

/// A property location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

/// Display state of the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapState {
    /// No coordinates to render; see [`NO_LOCATION_MESSAGE`].
    NoCoordinates,
    /// No access token configured; see [`MISSING_TOKEN_MESSAGE`].
    MissingToken,
    /// Renderable, but no image has been decoded yet.
    Loading,
    /// An image was fetched and decoded.
    Loaded,
    /// The last fetch or decode failed; carries the display message.
    Error(String),
}

/// Contents of the error panel, including the credential remediation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPanel<'a> {
    /// Panel heading.
    pub title: &'static str,
    /// Failure message.
    pub message: &'a str,
    /// Remediation link target.
    pub link_url: &'static str,
    /// Remediation link label.
    pub link_label: &'static str,
}

/// Static map preview for one property location.
pub struct MapPreview {
    access: MapboxAccess,
    coordinates: Option<Coordinates>,
    location_name: String,
    zoom: u8,
    loaded: bool,
    error: Option<String>,
    http_client: reqwest::Client,
}

impl MapPreview {
    /// Create a preview for a location.
    ///
    /// The access token is injected here rather than read from the ambient
    /// environment, so an absent token is an explicit state the caller can
    /// render.
    #[must_use]
    pub fn new(
        access: MapboxAccess,
        coordinates: Option<Coordinates>,
        location_name: impl Into<String>,
    ) -> Self {
        Self {
            access,
            coordinates,
            location_name: location_name.into(),
            zoom: DEFAULT_ZOOM,
            loaded: false,
            error: None,
            http_client: reqwest::Client::new(),
        }
    }

    /// Set the starting zoom level, clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    #[must_use]
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }

    /// Current display state.
    #[must_use]
    pub fn state(&self) -> MapState {
        if self.coordinates.is_none() {
            return MapState::NoCoordinates;
        }
        if self.access.is_missing() {
            return MapState::MissingToken;
        }
        if let Some(message) = &self.error {
            return MapState::Error(message.clone());
        }
        if self.loaded {
            return MapState::Loaded;
        }
        MapState::Loading
    }

    /// Current zoom level.
    #[must_use]
    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Zoom in one level, clamped to [`MAX_ZOOM`]. Load and error flags are
    /// untouched; the URL simply changes. Returns the new zoom.
    pub fn zoom_in(&mut self) -> u8 {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
        self.zoom
    }

    /// Zoom out one level, clamped to [`MIN_ZOOM`]. Load and error flags are
    /// untouched. Returns the new zoom.
    pub fn zoom_out(&mut self) -> u8 {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
        self.zoom
    }

    /// Point the preview at new coordinates (or none), always resetting the
    /// load and error flags.
    pub fn set_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.coordinates = coordinates;
        self.loaded = false;
        self.error = None;
    }

    /// The static image URL for the current coordinates, token, and zoom.
    ///
    /// `None` in the two short-circuit states.
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        let Coordinates {
            longitude,
            latitude,
        } = self.coordinates?;
        let token = self.access.token()?;
        let zoom = self.zoom;

        // The pin segment takes lon,lat; the center segment takes
        // lat,lon,zoom,rotation.
        Some(format!(
            "{MAPBOX_STYLE_BASE}/pin-s+ff0000({longitude},{latitude})/{latitude},{longitude},{zoom},0/{IMAGE_SIZE}?access_token={token}&attribution=false&logo=false"
        ))
    }

    /// Alt text for the rendered image.
    #[must_use]
    pub fn alt_text(&self) -> String {
        format!("Map of {}", self.location_name)
    }

    /// Coordinate caption under the image, 6 decimal places.
    #[must_use]
    pub fn coordinate_label(&self) -> Option<String> {
        self.coordinates.map(
            |Coordinates {
                 longitude,
                 latitude,
             }| format!("{longitude:.6}, {latitude:.6}"),
        )
    }

    /// Remediation detail for the missing-token display, naming the
    /// environment variable to set.
    #[must_use]
    pub fn missing_token_detail() -> String {
        format!("Please set {MAPBOX_TOKEN_ENV} in your environment variables")
    }

    /// Error panel contents, present only in the error state.
    #[must_use]
    pub fn error_panel(&self) -> Option<ErrorPanel<'_>> {
        self.error.as_deref().map(|message| ErrorPanel {
            title: ERROR_PANEL_TITLE,
            message,
            link_url: TOKEN_SETTINGS_URL,
            link_label: TOKEN_SETTINGS_LABEL,
        })
    }

    /// Fetch and decode the static map image, returning its bytes.
    ///
    /// In a short-circuit state this returns a validation error carrying the
    /// display message and issues no request. Otherwise the state resets to
    /// Loading, and a fetch or decode failure moves it to Error.
    pub async fn load(&mut self) -> AppResult<Vec<u8>> {
        let Some(url) = self.image_url() else {
            let message = match self.state() {
                MapState::NoCoordinates => NO_LOCATION_MESSAGE,
                _ => MISSING_TOKEN_MESSAGE,
            };
            return Err(AppError::Validation(message.to_string()));
        };

        self.loaded = false;
        self.error = None;

        tracing::debug!(zoom = self.zoom, "Requesting static map image");

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(format!("Map request failed: {e}"))),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(self.fail(format!("Map API error: {status}")));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return Err(self.fail(format!("Failed to read map image: {e}"))),
        };

        self.decode_image(&bytes)?;
        Ok(bytes)
    }

    /// Decode fetched image bytes, moving the state to Loaded or Error.
    pub fn decode_image(&mut self, bytes: &[u8]) -> AppResult<()> {
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                tracing::debug!(
                    width = decoded.width(),
                    height = decoded.height(),
                    "Map image decoded"
                );
                self.loaded = true;
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(format!("Failed to decode map image: {e}"))),
        }
    }

    /// Record a failure: the display message is fixed, the underlying detail
    /// goes to the log and the returned error.
    fn fail(&mut self, detail: String) -> AppError {
        tracing::warn!(error = %detail, "Map preview failed");
        self.loaded = false;
        self.error = Some(LOAD_ERROR_MESSAGE.to_string());
        AppError::ExternalService(detail)
    }
}
