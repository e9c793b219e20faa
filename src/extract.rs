use log::{debug, info, warn};

use crate::{
    container::{Container, Group},
    error::{ConvertError, Result},
    layout::{weight_name, WeightKind, LAYERS_GROUP, LAYER_NAMES, VARS_GROUP},
    tensor::{WeightSet, WeightTensor},
};

/// Extracts the dense layer weights of a policy network.
///
/// Walks `layers/<layer_name>/vars/{0,1}` for every known layer; missing
/// layers, `vars` groups or variables are skipped.
///
/// # Errors
/// If the container has no `layers` group or any read fails. No partial set
/// is returned in that case.
pub fn extract_weights<C: Container>(container: &C) -> Result<WeightSet> {
    let root = container.root()?;

    match root.nodes() {
        Ok(nodes) => {
            info!("container structure for {}:", container.name());
            for node in nodes {
                info!("  {node}");
            }
        }
        Err(e) => warn!("could not list the structure of {}: {e}", container.name()),
    }

    let layers = root
        .subgroup(LAYERS_GROUP)?
        .ok_or_else(|| ConvertError::MissingGroup {
            path: container.name(),
            group: LAYERS_GROUP,
        })?;

    let mut weights = WeightSet::new();

    for layer_name in LAYER_NAMES {
        let Some(layer) = layers.subgroup(layer_name)? else {
            debug!("layer {layer_name} not present");
            continue;
        };

        let Some(vars) = layer.subgroup(VARS_GROUP)? else {
            debug!("layer {layer_name} has no {VARS_GROUP} group");
            continue;
        };

        for kind in WeightKind::ALL {
            if let Some(data) = vars.dataset(kind.var_index())? {
                let tensor = WeightTensor::new(weight_name(layer_name, kind), data);
                info!("extracted {}: {:?}", tensor.name(), tensor.shape());
                weights.insert(tensor);
            }
        }
    }

    Ok(weights)
}
