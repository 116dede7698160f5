//! Reading the layers a WMTS offers from its capabilities document.
//!
//! Elements are matched by local name, so documents with or without namespace prefixes
//! (`ows:Identifier`, `Identifier`) are treated alike.

use super::capabilities_url;
use crate::SourceClient;
use anyhow::{Context, Result, anyhow, bail, ensure};
use roxmltree::{Document, Node};
use tileharvest_core::{BoundingExtent, HarvestError, LayerCapabilities, MapService, Srs, TileMatrixLimits};

fn is(node: &Node, name: &str) -> bool {
	node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
	node.children().find(|c| is(c, name))
}

fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
	child(node, name).and_then(|c| c.text()).map(str::trim)
}

fn descendant_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
	node.descendants().find(|c| is(c, name)).and_then(|c| c.text()).map(str::trim)
}

fn parse_corner(text: &str) -> Result<(f64, f64)> {
	let mut parts = text.split_whitespace().map(str::parse::<f64>);
	match (parts.next(), parts.next()) {
		(Some(Ok(x)), Some(Ok(y))) => Ok((x, y)),
		_ => bail!("invalid corner '{text}'"),
	}
}

/// Extent from the first `LowerCorner`/`UpperCorner` pair, or the whole world.
fn geographic_extent(layer: &Node) -> Result<BoundingExtent> {
	match (descendant_text(layer, "LowerCorner"), descendant_text(layer, "UpperCorner")) {
		(Some(lower), Some(upper)) => {
			let (x0, y0) = parse_corner(lower)?;
			let (x1, y1) = parse_corner(upper)?;
			BoundingExtent::new(x0, y0, x1, y1, Srs::wgs84())
		}
		_ => Ok(BoundingExtent::world_wgs84()),
	}
}

fn parse_limits(node: &Node) -> Result<TileMatrixLimits> {
	let field = |name: &str| -> Result<u32> {
		let text = child_text(node, name).ok_or_else(|| anyhow!("TileMatrixLimits without {name}"))?;
		text.parse::<u32>().with_context(|| format!("invalid {name} '{text}'"))
	};
	let matrix = child_text(node, "TileMatrix").ok_or_else(|| anyhow!("TileMatrixLimits without TileMatrix"))?;
	TileMatrixLimits::new(
		matrix,
		field("MinTileRow")?,
		field("MaxTileRow")?,
		field("MinTileCol")?,
		field("MaxTileCol")?,
	)
}

fn parse_layer(layer: &Node, identifier: &str, matrix_set: &str) -> Result<LayerCapabilities> {
	let mut limits = Vec::new();
	for link in layer.children().filter(|c| is(c, "TileMatrixSetLink")) {
		if child_text(&link, "TileMatrixSet") != Some(matrix_set) {
			continue;
		}
		for node in link.descendants().filter(|c| is(c, "TileMatrixLimits")) {
			match parse_limits(&node) {
				Ok(entry) => limits.push(entry),
				Err(e) => log::warn!("layer '{identifier}': ignoring tile matrix limits: {e:#}"),
			}
		}
	}
	Ok(LayerCapabilities {
		identifier: identifier.to_owned(),
		limits,
		geographic_extent: geographic_extent(layer).with_context(|| format!("bounding box of layer '{identifier}'"))?,
	})
}

/// Extracts the requested layers from a capabilities document, in requested order.
///
/// Requested layers missing from the document are skipped with a warning, and so are limits
/// entries that cannot be read or name no usable level. A found layer without usable limits
/// for `matrix_set` is an error, as is finding none of the requested layers.
pub fn parse_capabilities(xml: &str, layers: &[String], matrix_set: &str) -> Result<Vec<LayerCapabilities>> {
	let doc = Document::parse(xml).context("capabilities document is not valid XML")?;

	let mut found: Vec<LayerCapabilities> = Vec::new();
	for node in doc.descendants().filter(|n| is(n, "Layer")) {
		let Some(identifier) = child_text(&node, "Identifier") else {
			continue;
		};
		if !layers.iter().any(|l| l == identifier) || found.iter().any(|f| f.identifier == identifier) {
			continue;
		}
		let layer = parse_layer(&node, identifier, matrix_set)?;
		ensure!(
			!layer.limits.is_empty(),
			"layer '{identifier}' has no tile matrix limits for matrix set '{matrix_set}'"
		);
		log::debug!(
			"layer '{identifier}': {} tile matrices, extent {:?}",
			layer.limits.len(),
			layer.geographic_extent
		);
		found.push(layer);
	}

	let mut ordered = Vec::with_capacity(layers.len());
	for name in layers {
		match found.iter().position(|l| &l.identifier == name) {
			Some(index) => ordered.push(found.swap_remove(index)),
			None if ordered.iter().any(|l| &l.identifier == name) => {}
			None => log::warn!("layer '{name}' is not offered by the service, skipping it"),
		}
	}
	ensure!(!ordered.is_empty(), "none of the layers {layers:?} is offered by the service");
	Ok(ordered)
}

async fn fetch_and_parse(
	client: &dyn SourceClient,
	service: &MapService,
	matrix_set: &str,
) -> Result<Vec<LayerCapabilities>> {
	let url = capabilities_url(&service.url, &service.service_type);
	log::debug!("fetching capabilities from '{url}'");
	let body = client.get(&url).await?;
	parse_capabilities(&body.as_str_lossy(), &service.layers, matrix_set)
}

/// Fetches and parses the capabilities of `service`.
///
/// Every failure is an invalid request: the service is unreachable, the document is
/// unusable, or it does not offer what was asked for.
pub async fn resolve_capabilities(
	client: &dyn SourceClient,
	service: &MapService,
	matrix_set: &str,
) -> Result<Vec<LayerCapabilities>> {
	fetch_and_parse(client, service, matrix_set)
		.await
		.map_err(|e| HarvestError::InvalidRequest(format!("capabilities of '{}': {e:#}", service.url)).into())
}
