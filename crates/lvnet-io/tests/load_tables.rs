use std::fs;
use std::path::Path;

use lvnet_algo::verify;
use lvnet_io::{load_circuit, CircuitPaths, ColumnLayout, LvnetConfig};
use tempfile::tempdir;

const TRANSFORMER: &str = "Nodo,Circuito,Tipo,Vp,Vs,Topologia\n1,5001,3,13200,220,1\n";
const SEGMENTS: &str = "\
Ni,Nf,Fase,Calibre,Montaje,Longitud,MatF,CalN,MatN,Nombre
1,2,7,4,1,35.2,2,4,2,T1
2,3,1,4,1,20.0,2,4,2,T2
2,4,2,4,2,18.5,1,4,1,T3
";
const USERS: &str = "\
Nodo,Fase,Carga,Cuenta,Medidor,Estrato,Clase,Nombre
3,1,1.2,100,1,2,1,casa
4,2,0.8,101,2,3,1,tienda
";
const CURVE: &str = "Hora,Valor\n1,0.4\n2,0.6\n3,0.9\n";

fn write_circuit(dir: &Path, segments: &str) -> CircuitPaths {
    let paths = CircuitPaths {
        transformer: dir.join("Trafos.csv"),
        segments: dir.join("Tramos.csv"),
        users: dir.join("Usuarios.csv"),
        load_curve: dir.join("Curvas.csv"),
    };
    fs::write(&paths.transformer, TRANSFORMER).unwrap();
    fs::write(&paths.segments, segments).unwrap();
    fs::write(&paths.users, USERS).unwrap();
    fs::write(&paths.load_curve, CURVE).unwrap();
    paths
}

#[test]
fn csv_circuit_verifies_as_normal() {
    let dir = tempdir().unwrap();
    let paths = write_circuit(dir.path(), SEGMENTS);
    let input = load_circuit(&paths, &ColumnLayout::default()).unwrap();

    assert_eq!(input.segments.len(), 3);
    assert_eq!(input.users.len(), 2);
    assert_eq!(input.users[1].stratum, 3);
    assert_eq!(input.segments[2].phase_material, 1);
    assert_eq!(input.load_curve.values().len(), 6);

    let config = LvnetConfig::default();
    let result = verify(&input, &config.compatibility().unwrap());
    assert_eq!(result.error_code(), 0, "{result}");
}

#[test]
fn csv_circuit_with_bad_phasing() {
    let dir = tempdir().unwrap();
    let segments = SEGMENTS.replace("2,3,1,4,1", "2,3,1,4,1").replace("1,2,7,4", "1,2,3,4");
    let paths = write_circuit(dir.path(), &segments);
    let input = load_circuit(&paths, &ColumnLayout::default()).unwrap();
    let result = verify(&input, &LvnetConfig::default().compatibility().unwrap());
    assert_eq!(result.error_code(), 25);
    assert_eq!(
        result.details,
        vec![
            "Bad phasing from 1 - 2 to 2 - 3",
            "Bad phasing from 1 - 2 to 2 - 4"
        ]
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let mut paths = write_circuit(dir.path(), SEGMENTS);
    paths.users = dir.path().join("absent.csv");
    let err = load_circuit(&paths, &ColumnLayout::default()).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}
