//! The single-page upload form, served as-is from memory.

pub const INDEX: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Mobile Uploader</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }
  h1 { font-size: 1.5rem; }
  .caption { color: #555; }
  .warning { background: #fff3cd; border: 1px solid #ffe69c; padding: 0.5rem 0.75rem; border-radius: 4px; margin: 1rem 0; }
  label { display: block; font-weight: 600; margin: 1rem 0 0.25rem; }
  input[type=text] { width: 100%; padding: 0.4rem; box-sizing: border-box; }
  button { margin-top: 1rem; padding: 0.5rem 1.25rem; }
  #status p { margin: 0.25rem 0; }
  progress { width: 100%; }
  .ok { color: #1a7f37; }
  .err { color: #b42318; }
</style>
</head>
<body>
<h1>&#128241; Mobile Uploader</h1>
<p class="caption">Convenience uploader for phones and small batches.</p>
<p class="warning">&#9888;&#65039; This uploader holds every selected file in memory. It is not for large batches.</p>

<form id="upload-form">
  <label for="gallery">1. Enter a name for the folder/playlist</label>
  <input type="text" id="gallery" name="gallery" autocomplete="off">
  <label for="files">2. Select photos or videos to upload</label>
  <input type="file" id="files" name="files" multiple>
  <button type="submit">&#9729;&#65039; Upload to Cloud</button>
</form>

<div id="status"></div>

<script>
const form = document.getElementById('upload-form');
const status = document.getElementById('status');
const bars = new Map();

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  status.textContent = '';
  bars.clear();
  const button = form.querySelector('button');
  button.disabled = true;
  try {
    const resp = await fetch('/upload', { method: 'POST', body: new FormData(form) });
    if (!resp.ok) {
      line('Upload failed: ' + await resp.text(), 'err');
      return;
    }
    await consume(resp.body.getReader());
  } catch (err) {
    line('Upload failed: ' + err, 'err');
  } finally {
    button.disabled = false;
  }
});

async function consume(reader) {
  const decoder = new TextDecoder();
  let buffered = '';
  for (;;) {
    const { done, value } = await reader.read();
    if (done) break;
    buffered += decoder.decode(value, { stream: true });
    let idx;
    while ((idx = buffered.indexOf('\n')) >= 0) {
      const raw = buffered.slice(0, idx).trim();
      buffered = buffered.slice(idx + 1);
      if (raw) render(JSON.parse(raw));
    }
  }
}

function render(ev) {
  switch (ev.event) {
    case 'progress': {
      let bar = bars.get(ev.file);
      if (!bar) {
        const p = document.createElement('p');
        p.textContent = 'Uploading ' + ev.file + ' to ' + ev.destination + '...';
        bar = document.createElement('progress');
        bar.max = 100;
        status.appendChild(p);
        status.appendChild(bar);
        bars.set(ev.file, bar);
      }
      bar.value = ev.percent;
      break;
    }
    case 'outcome':
      if (ev.status === 'video') line('✅ Uploaded video ' + ev.file + ' (id ' + ev.id + ')', 'ok');
      else if (ev.status === 'image') line('✅ Uploaded image ' + ev.file + ' (id ' + ev.id + ')', 'ok');
      else if (ev.status === 'skipped') line('⚠️ Skipped unsupported file type: ' + ev.file, '');
      else line('❌ Failed ' + ev.file + ': ' + ev.message, 'err');
      break;
    case 'warning':
      line('⚠️ ' + ev.message, '');
      break;
    case 'done':
      line('🎉 All files processed! ' + ev.uploaded + ' uploaded, '
        + ev.skipped + ' skipped, ' + ev.failed + ' failed.', ev.failed ? 'err' : 'ok');
      break;
    case 'error':
      line('❌ ' + ev.message, 'err');
      break;
  }
}

function line(text, cls) {
  const p = document.createElement('p');
  if (cls) p.className = cls;
  p.textContent = text;
  status.appendChild(p);
}
</script>
</body>
</html>
"##;
