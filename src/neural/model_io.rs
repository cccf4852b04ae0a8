//! Checkpoint serialization.
//!
//! Weights are stored as safetensors files, which stay portable across
//! libtorch versions (tch's native `VarStore::save` format does not).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use safetensors::serialize_to_file;
use safetensors::tensor::{Dtype, SafeTensors, TensorView};
use tch::{nn, Kind, Tensor};

use crate::{Error, Result};

/// Save every variable of a VarStore to a safetensors file.
pub fn save_varstore(vs: &nn::VarStore, path: impl AsRef<Path>) -> Result<()> {
    let mut buffers: HashMap<String, (Vec<usize>, Vec<u8>)> = HashMap::new();

    for (name, tensor) in vs.variables() {
        let shape: Vec<usize> = tensor.size().iter().map(|&d| d as usize).collect();
        let data = tensor_to_bytes(&tensor)?;
        buffers.insert(name, (shape, data));
    }

    let views: HashMap<String, TensorView<'_>> = buffers
        .iter()
        .map(|(name, (shape, data))| {
            let view = TensorView::new(Dtype::F32, shape.clone(), data)
                .map_err(|e| Error::Model(format!("{}: {:?}", name, e)))?;
            Ok((name.clone(), view))
        })
        .collect::<Result<_>>()?;

    serialize_to_file(views, &None, path.as_ref())
        .map_err(|e| Error::Model(format!("saving {}: {}", path.as_ref().display(), e)))?;
    Ok(())
}

/// Load variables from a safetensors file into an existing VarStore.
///
/// Variables with no counterpart in the file keep their current weights and
/// are logged.
pub fn load_varstore(vs: &mut nn::VarStore, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::open(path.as_ref())?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    let tensors = SafeTensors::deserialize(&buffer)
        .map_err(|e| Error::Model(format!("parsing {}: {}", path.as_ref().display(), e)))?;

    for (name, mut var) in vs.variables() {
        match tensors.tensor(&name) {
            Ok(view) => {
                let loaded = view_to_tensor(&view)?;
                tch::no_grad(|| {
                    var.copy_(&loaded);
                });
            }
            Err(_) => {
                log::warn!(
                    "tensor '{}' not found in {}, keeping current weights",
                    name,
                    path.as_ref().display()
                );
            }
        }
    }

    Ok(())
}

fn tensor_to_bytes(tensor: &Tensor) -> Result<Vec<u8>> {
    // All our parameters are f32; anything else would be a checkpoint bug.
    let tensor = tensor
        .to_device(tch::Device::Cpu)
        .to_kind(Kind::Float)
        .flatten(0, -1)
        .contiguous();
    let data = Vec::<f32>::try_from(&tensor)?;
    Ok(data.iter().flat_map(|x| x.to_le_bytes()).collect())
}

fn view_to_tensor(view: &TensorView) -> Result<Tensor> {
    if view.dtype() != Dtype::F32 {
        return Err(Error::Model(format!(
            "unsupported checkpoint dtype {:?}",
            view.dtype()
        )));
    }
    let shape: Vec<i64> = view.shape().iter().map(|&d| d as i64).collect();
    let floats: Vec<f32> = view
        .data()
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(Tensor::from_slice(&floats).reshape(&shape))
}
