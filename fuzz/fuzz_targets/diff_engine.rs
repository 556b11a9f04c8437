#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let key_count = (data.first().copied().unwrap_or(0) % 16) as u32;
    let cylinder_count = (data.get(1).copied().unwrap_or(0) % 16) as u32;

    let keys: Vec<lockdiff::Key> = (0..key_count)
        .map(|k| lockdiff::Key::new(format!("K{k}")))
        .collect();
    let cylinders: Vec<lockdiff::Cylinder> = (0..cylinder_count)
        .map(|c| lockdiff::Cylinder::new(format!("C{c}"), format!("Tür {c}")))
        .collect();

    let mut grants_a: Vec<Vec<String>> = vec![Vec::new(); key_count as usize];
    let mut grants_b: Vec<Vec<String>> = vec![Vec::new(); key_count as usize];

    if key_count > 0 && cylinder_count > 0 {
        let mut i = 2usize;
        let mut inserted = 0usize;
        while i + 2 < data.len() && inserted < 64 {
            let which = data[i] & 1;
            let k = (data[i + 1] as u32 % key_count) as usize;
            let c = data[i + 2] as u32 % cylinder_count;

            if which == 0 {
                grants_a[k].push(format!("C{c}"));
            } else {
                grants_b[k].push(format!("C{c}"));
            }

            inserted += 1;
            i += 3;
        }
    }

    let permissions = |grants: Vec<Vec<String>>| -> Vec<(String, Vec<String>)> {
        grants
            .into_iter()
            .enumerate()
            .map(|(k, cylinder_ids)| (format!("K{k}"), cylinder_ids))
            .collect()
    };

    let source =
        lockdiff::PermissionModel::new(keys.clone(), cylinders.clone(), permissions(grants_a));
    let destination = lockdiff::PermissionModel::new(keys, cylinders, permissions(grants_b));

    let mut change_count = 0usize;
    let mut sink =
        lockdiff::CallbackSink::new(|_record| change_count = change_count.saturating_add(1));
    let _ = lockdiff::try_diff_models_streaming(&source, &destination, &mut sink);
});
