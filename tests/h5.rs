#![cfg(feature = "hdf5")]

use std::{fs, path::Path};

use h5_to_tfjs::{
    configs::{ConvertConfig, ModelJob},
    container::{Container, Group, H5Container},
    convert, extract_weights,
    pack::SHARD_FILE_NAME,
    read_manifest, unpack_weights, Dtype,
};
use ndarray::{Array1, Array2};

fn write_policy(path: &Path, layers: &[&str]) -> hdf5::Result<()> {
    let file = hdf5::File::create(path)?;
    let root = file.create_group("layers")?;

    for (i, layer) in layers.iter().enumerate() {
        let vars = root.create_group(layer)?.create_group("vars")?;
        let kernel = Array2::from_shape_fn((3, 2), |(r, c)| (i * 10 + r * 2 + c) as f64 / 3.0);
        let bias = Array1::from_elem(2, i as f32);
        vars.new_dataset_builder().with_data(&kernel).create("0")?;
        vars.new_dataset_builder().with_data(&bias).create("1")?;
    }

    file.create_group("optimizer")?;
    Ok(())
}

#[test]
fn reads_keras_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actor.weights.h5");
    write_policy(&path, &["dense", "dense_1", "dense_2", "dense_3"]).unwrap();

    let container = H5Container::open(&path).unwrap();
    let nodes = container.root().unwrap().nodes().unwrap();
    assert!(nodes.iter().any(|n| n.path == "/layers/dense_3/vars/1"));

    let weights = extract_weights(&container).unwrap();
    assert_eq!(weights.len(), 8);

    let kernel = weights.get("dense/kernel").unwrap();
    assert_eq!(kernel.data().dtype(), Dtype::F64);
    assert_eq!(kernel.shape(), &[3, 2]);
}

#[test]
fn converts_h5_files_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("best_actor_sac.weights.h5");
    write_policy(&source, &["dense", "dense_1", "dense_3"]).unwrap();
    fs::write(dir.path().join("broken.weights.h5"), b"not hdf5").unwrap();

    let out = dir.path().join("models");
    let config = ConvertConfig::new(
        &out,
        vec![
            ModelJob::new("td3", dir.path().join("broken.weights.h5")),
            ModelJob::new("sac", &source),
        ],
    );

    let reports = convert(&config);
    assert!(!reports[0].is_converted());
    assert!(reports[1].is_converted());

    let specs = read_manifest(&out.join("sac")).unwrap();
    let bytes = fs::read(out.join("sac").join(SHARD_FILE_NAME)).unwrap();
    assert_eq!(specs.len(), 6);
    assert_eq!(bytes.len(), 3 * 4 * (3 * 2 + 2));

    let arrays = unpack_weights(&bytes, &specs).unwrap();
    assert_eq!(arrays[0].1[&[2, 1][..]], (5.0f64 / 3.0) as f32);
}

#[test]
fn casts_integer_and_boolean_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quantized.weights.h5");
    {
        let file = hdf5::File::create(&path).unwrap();
        let layers = file.create_group("layers").unwrap();

        let dense = layers.create_group("dense").unwrap().create_group("vars").unwrap();
        let kernel = Array2::from_shape_vec((2, 2), vec![0u8, 7, 128, 255]).unwrap();
        dense.new_dataset_builder().with_data(&kernel).create("0").unwrap();
        let bias = Array1::from_vec(vec![-300i16, 300]);
        dense.new_dataset_builder().with_data(&bias).create("1").unwrap();

        let dense_1 = layers.create_group("dense_1").unwrap().create_group("vars").unwrap();
        let kernel = Array2::from_shape_vec((2, 1), vec![65535u16, 1]).unwrap();
        dense_1.new_dataset_builder().with_data(&kernel).create("0").unwrap();
        let bias = Array1::from_vec(vec![true]);
        dense_1.new_dataset_builder().with_data(&bias).create("1").unwrap();
    }

    let container = H5Container::open(&path).unwrap();
    let weights = extract_weights(&container).unwrap();
    let dtypes: Vec<_> = weights.iter().map(|t| t.data().dtype()).collect();
    assert_eq!(dtypes, [Dtype::U8, Dtype::I16, Dtype::U16, Dtype::Bool]);

    let mut buf = Vec::new();
    let specs = h5_to_tfjs::write_weights(&weights, &mut buf).unwrap();
    assert_eq!(buf.len(), 4 * (4 + 2 + 2 + 1));

    let arrays = unpack_weights(&buf, &specs).unwrap();
    let values: Vec<Vec<f32>> = arrays.iter().map(|(_, a)| a.iter().copied().collect()).collect();
    assert_eq!(
        values,
        [
            vec![0.0, 7.0, 128.0, 255.0],
            vec![-300.0, 300.0],
            vec![65535.0, 1.0],
            vec![1.0],
        ]
    );
}
