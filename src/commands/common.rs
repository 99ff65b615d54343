//! # 子命令公共逻辑
//!
//! 多个子命令共用的读取与校验步骤。
//!
//! ## 依赖关系
//! - 使用 `parsers/`, `analysis/valence.rs`, `utils/progress.rs`

use crate::analysis::valence;
use crate::config::InputPaths;
use crate::error::{OccubandError, Result};
use crate::models::{BandStructure, Composition, Crystal, PotcarEntry};
use crate::parsers::{poscar, potcar, vasprun};
use crate::utils::progress;
use log::{debug, warn};
use std::path::Path;

/// 解析 vasprun.xml 并设置来自 OUTCAR 的费米能
pub fn load_bands(path: &Path, efermi: f64) -> Result<BandStructure> {
    let pb = progress::create_spinner(&format!("Parsing {}", path.display()));
    let parsed = vasprun::parse_bands(path);
    pb.finish_and_clear();

    let bands = parsed?.with_efermi(efermi);

    if let Some(xml_efermi) = bands.xml_efermi {
        if (xml_efermi - efermi).abs() > 1e-6 {
            debug!(
                "E-fermi differs: OUTCAR {} eV, vasprun.xml {} eV; using OUTCAR",
                efermi, xml_efermi
            );
        }
    }

    Ok(bands)
}

/// 价电子统计所需的输入
#[derive(Debug, Clone)]
pub struct ValenceInputs {
    pub entries: Vec<PotcarEntry>,
    pub crystal: Crystal,
    pub composition: Composition,
}

/// 读取 POTCAR 与 POSCAR
///
/// POTCAR 先读，VASP 4 格式的 POSCAR 没有元素行时借用其元素符号。
pub fn load_valence_inputs(paths: &InputPaths) -> Result<ValenceInputs> {
    let entries = potcar::parse_potcar_file(&paths.potcar)?;

    let (crystal, composition) = match poscar::parse_poscar_file(&paths.poscar) {
        Err(OccubandError::MissingField { .. }) => {
            debug!("'{}' has no species line; using POTCAR symbols", paths.poscar.display());
            let symbols: Vec<String> = entries.iter().map(|e| e.symbol.clone()).collect();
            poscar::parse_poscar_with_symbols(&paths.poscar, &symbols)?
        }
        other => other?,
    };

    Ok(ValenceInputs {
        entries,
        crystal,
        composition,
    })
}

/// 检查 POSCAR/POTCAR 元素顺序
///
/// 严格模式下符号不一致即报错；否则只给出警告，继续按位置配对。
pub fn verify_alignment(
    composition: &Composition,
    entries: &[PotcarEntry],
    strict: bool,
) -> Result<()> {
    match valence::check_alignment(composition, entries) {
        Err(e @ OccubandError::SymbolMismatch { .. }) if !strict => {
            warn!("{}; pairing POSCAR and POTCAR by position anyway", e);
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::occupancy::count_occupied;
    use std::fs;
    use tempfile::TempDir;

    const VASPRUN_WITH_EFERMI: &str = r#"<modeling>
 <calculation>
  <eigenvalues>
   <array>
    <set>
     <set comment="spin 1">
      <set comment="kpoint 1">
       <r>   -2.0000    1.0000 </r>
       <r>    0.5000    1.0000 </r>
       <r>    1.5000    0.0000 </r>
      </set>
     </set>
    </set>
   </array>
  </eigenvalues>
  <dos>
   <i name="efermi">      1.00000000 </i>
  </dos>
 </calculation>
</modeling>
"#;

    fn entry(symbol: &str) -> PotcarEntry {
        PotcarEntry {
            symbol: symbol.to_string(),
            label: symbol.to_string(),
            header: String::new(),
            zval: 1.0,
            content: String::new(),
        }
    }

    #[test]
    fn test_verify_alignment_lenient_and_strict() {
        let comp = Composition::from_symbols(["O", "Fe"]);
        let entries = vec![entry("Fe"), entry("O")];

        assert!(verify_alignment(&comp, &entries, false).is_ok());
        assert!(matches!(
            verify_alignment(&comp, &entries, true),
            Err(OccubandError::SymbolMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_alignment_count_mismatch_always_fails() {
        let comp = Composition::from_symbols(["O", "Fe"]);
        let entries = vec![entry("O")];
        assert!(matches!(
            verify_alignment(&comp, &entries, false),
            Err(OccubandError::ElementCountMismatch { .. })
        ));
    }

    #[test]
    fn test_load_bands_uses_outcar_efermi() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vasprun.xml");
        fs::write(&path, VASPRUN_WITH_EFERMI).unwrap();

        let bands = load_bands(&path, 0.0).unwrap();
        assert_eq!(bands.efermi, Some(0.0));
        assert_eq!(bands.xml_efermi, Some(1.0));
        // 若误用 vasprun.xml 的 1.0 eV，结果会是 2
        assert_eq!(count_occupied(&bands, bands.efermi.unwrap(), 0).unwrap(), 1);
    }

    #[test]
    fn test_load_valence_inputs_vasp4_borrows_potcar_symbols() {
        let dir = TempDir::new().unwrap();
        let paths = InputPaths::from_dir(dir.path());
        fs::write(
            &paths.potcar,
            "  PAW_PBE Ti_pv 07Sep2000\n   POMASS =   47.880; ZVAL   =   10.000    mass and valenz\n End of Dataset\n  PAW_PBE O 08Apr2002\n   POMASS =   16.000; ZVAL   =    6.000    mass and valenz\n End of Dataset\n",
        )
        .unwrap();
        fs::write(
            &paths.poscar,
            "TiO2\n1.0\n4.6 0.0 0.0\n0.0 4.6 0.0\n0.0 0.0 3.0\n1 2\nDirect\n0.0 0.0 0.0\n0.3 0.3 0.0\n0.7 0.7 0.0\n",
        )
        .unwrap();

        let inputs = load_valence_inputs(&paths).unwrap();
        assert_eq!(
            inputs.composition.iter().collect::<Vec<_>>(),
            vec![("Ti", 1), ("O", 2)]
        );
        assert_eq!(inputs.entries[0].zval, 10.0);
        assert_eq!(inputs.crystal.name, "TiO2");
    }
}
