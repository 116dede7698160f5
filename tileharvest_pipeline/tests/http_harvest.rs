//! Harvests from a WMTS served over HTTP on localhost.

use anyhow::Result;
use assert_fs::TempDir;
use axum::{
	Router,
	extract::{Query, State},
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing::get,
};
use pretty_assertions::assert_eq;
use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
use tileharvest_container::MBTilesStore;
use tileharvest_core::{BoundingExtent, CancellationSignal, HarvestRequest, MapService, ProgressRegistry, Srs};
use tileharvest_image::{image2blob, test_images::solid};
use tileharvest_pipeline::{
	HarvestOptions, HarvestState, Harvester, HttpClient, HttpOptions, SizeEstimator, SourceClient, SourceRegistry,
};
use tokio::net::TcpListener;

const CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="http://www.opengis.net/wmts/1.0" xmlns:ows="http://www.opengis.net/ows/1.1" version="1.0.0">
  <Contents>
    <Layer>
      <ows:Identifier>relief</ows:Identifier>
      <ows:WGS84BoundingBox>
        <ows:LowerCorner>-20 -10</ows:LowerCorner>
        <ows:UpperCorner>20 10</ows:UpperCorner>
      </ows:WGS84BoundingBox>
      <TileMatrixSetLink>
        <TileMatrixSet>EPSG:3857</TileMatrixSet>
        <TileMatrixSetLimits>
          <TileMatrixLimits><TileMatrix>EPSG:3857:0</TileMatrix><MinTileRow>0</MinTileRow><MaxTileRow>0</MaxTileRow><MinTileCol>0</MinTileCol><MaxTileCol>0</MaxTileCol></TileMatrixLimits>
          <TileMatrixLimits><TileMatrix>EPSG:3857:1</TileMatrix><MinTileRow>0</MinTileRow><MaxTileRow>1</MaxTileRow><MinTileCol>0</MinTileCol><MaxTileCol>1</MaxTileCol></TileMatrixLimits>
        </TileMatrixSetLimits>
      </TileMatrixSetLink>
    </Layer>
  </Contents>
</Capabilities>"#;

#[derive(Default)]
struct Wmts {
	tile_requests: AtomicUsize,
}

async fn wmts(State(state): State<Arc<Wmts>>, Query(params): Query<HashMap<String, String>>) -> Response {
	match params.get("REQUEST").map(String::as_str) {
		Some("GetCapabilities") => ([(header::CONTENT_TYPE, "application/xml")], CAPABILITIES).into_response(),
		Some("GetTile") if params.get("LAYER").map(String::as_str) == Some("relief") => {
			state.tile_requests.fetch_add(1, Ordering::SeqCst);
			let png = image2blob(&solid(256, 256, [120, 80, 40, 255])).unwrap();
			([(header::CONTENT_TYPE, "image/png")], png.into_vec()).into_response()
		}
		_ => (StatusCode::NOT_FOUND, "not found").into_response(),
	}
}

async fn serve() -> (String, Arc<Wmts>) {
	let state = Arc::new(Wmts::default());
	let router = Router::new().route("/wmts", get(wmts)).with_state(Arc::clone(&state));
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
	(format!("http://{addr}/wmts"), state)
}

fn client() -> Arc<HttpClient> {
	let options = HttpOptions {
		timeout: Duration::from_secs(5),
		retries: 0,
		..HttpOptions::default()
	};
	Arc::new(HttpClient::new(&options).unwrap())
}

fn request(url: &str) -> HarvestRequest {
	HarvestRequest {
		services: vec![MapService::new(url, &["relief"], "WMTS")],
		extent: BoundingExtent::new(-1.0, -1.0, 1.0, 1.0, Srs::wgs84()).unwrap(),
		min_zoom: 0,
		max_zoom: 1,
	}
}

#[tokio::test]
async fn http_client_reports_status_errors() -> Result<()> {
	let (url, _) = serve().await;
	let client = client();
	let body = client.get(&format!("{url}?SERVICE=WMTS&REQUEST=GetCapabilities")).await?;
	assert!(body.as_str_lossy().contains("<ows:Identifier>relief</ows:Identifier>"));

	let err = client.get(&format!("{url}?REQUEST=Nope")).await.unwrap_err();
	assert!(err.to_string().contains("404"), "{err}");
	Ok(())
}

#[tokio::test]
async fn harvest_over_http() -> Result<()> {
	let (url, state) = serve().await;
	let dir = TempDir::new()?;
	let output = dir.path().join("relief.mbtiles");

	let harvester = Harvester::new(
		Arc::new(SourceRegistry::with_defaults(client())),
		ProgressRegistry::new(),
		HarvestOptions::default(),
	);
	let outcome = harvester
		.run(1, &request(&url), &output, &CancellationSignal::new())
		.await?;

	// the extent touches all four tiles of level 1 at the origin
	assert_eq!(outcome.state(), HarvestState::Completed);
	assert_eq!(outcome.summary().total_tiles, 5);
	assert_eq!(outcome.summary().stored_tiles, 5);
	assert_eq!(state.tile_requests.load(Ordering::SeqCst), 5);

	let store = MBTilesStore::open(&output)?;
	assert_eq!(store.tile_count()?, 5);
	let meta = store.metadata()?;
	assert_eq!(meta["name"], "relief");
	assert_eq!(meta["format"], "png");
	assert_eq!(meta["bounds"], "-20,-10,20,10");
	Ok(())
}

#[tokio::test]
async fn estimate_over_http() -> Result<()> {
	let (url, state) = serve().await;
	let estimator = SizeEstimator::new(Arc::new(SourceRegistry::with_defaults(client())), "EPSG:3857");
	let estimate = estimator.estimate(&request(&url)).await?;
	assert_eq!(estimate.tile_count, 5);
	assert!(estimate.average_tile_size_kb > 0.0);
	assert!(state.tile_requests.load(Ordering::SeqCst) <= 10);
	Ok(())
}
