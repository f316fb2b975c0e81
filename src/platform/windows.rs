use anyhow::{Result, bail};
use windows_sys::Win32::Foundation::{BOOL, HWND, LPARAM};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, GetWindowTextW, IsWindowVisible,
};

/// Titles of all visible top-level windows with a non-empty title.
pub(super) fn top_level_window_titles() -> Result<Vec<String>> {
    let mut titles: Vec<String> = Vec::new();

    // SAFETY: the callback only runs during EnumWindows and `titles` outlives the call.
    let ok = unsafe { EnumWindows(Some(collect_title), &mut titles as *mut Vec<String> as LPARAM) };
    if ok == 0 {
        bail!("EnumWindows failed: {}", std::io::Error::last_os_error());
    }

    Ok(titles)
}

unsafe extern "system" fn collect_title(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the &mut Vec<String> passed by top_level_window_titles.
    let titles = unsafe { &mut *(lparam as *mut Vec<String>) };

    unsafe {
        if IsWindowVisible(hwnd) == 0 {
            return 1;
        }
        let len = GetWindowTextLengthW(hwnd);
        if len <= 0 {
            return 1;
        }
        let mut buf = vec![0u16; len as usize + 1];
        let copied = GetWindowTextW(hwnd, buf.as_mut_ptr(), buf.len() as i32);
        if copied > 0 {
            titles.push(String::from_utf16_lossy(&buf[..copied as usize]));
        }
    }

    1
}
